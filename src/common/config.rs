//! Configuration constants and runtime options for an index file.

/// Size of a block in bytes.
///
/// Every block in the file, including the header, occupies exactly this
/// many bytes. Block N is located at file offset `N × BLOCK_SIZE`.
pub const BLOCK_SIZE: usize = 512;

/// Minimum degree of the B-tree.
pub const MIN_DEGREE: usize = 10;

/// Maximum number of keys a node can hold (`2 × MIN_DEGREE − 1`).
pub const MAX_KEYS: usize = 2 * MIN_DEGREE - 1;

/// Maximum number of children a node can hold (`2 × MIN_DEGREE`).
pub const MAX_CHILDREN: usize = 2 * MIN_DEGREE;

/// Format tag stored in the first 8 bytes of the header block.
pub const MAGIC: [u8; 8] = *b"4337PRJ3";

/// Number of nodes kept resident by the node cache unless configured otherwise.
pub const DEFAULT_CACHE_CAPACITY: usize = 3;

/// Runtime options for opening or creating an index.
///
/// # Example
/// ```
/// use diskbtree::IndexOptions;
///
/// let options = IndexOptions::default().cache_capacity(64);
/// assert_eq!(options.capacity(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    cache_capacity: usize,
}

impl IndexOptions {
    /// Set the maximum number of resident nodes.
    ///
    /// # Panics
    /// Opening an index with a capacity of 0 panics.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Configured cache capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cache_capacity
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
