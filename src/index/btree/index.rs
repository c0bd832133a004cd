//! Public handle for one index file.

use std::path::Path;

use crate::index::btree::tree::Tree;
use crate::index::btree::Node;
use crate::buffer::CacheStats;
use crate::common::config::IndexOptions;
use crate::common::{BlockId, Error, Result};

/// A disk-backed B-tree mapping `u64` keys to `u64` values.
///
/// The handle starts **closed**. [`create`](Self::create) or
/// [`open`](Self::open) moves it to **open**, where the tree operations are
/// permitted; [`close`](Self::close) writes everything back and returns it
/// to closed. Tree operations on a closed handle fail with
/// [`Error::NotOpen`].
///
/// Duplicate keys are kept. [`search`](Self::search) returns the value met
/// first on the way down from the root.
///
/// # Thread Safety
/// Single-threaded. Callers sharing a file or a handle must serialize
/// access themselves.
///
/// # Example
/// ```no_run
/// use diskbtree::{BTreeIndex, IndexOptions};
///
/// let mut index = BTreeIndex::new(IndexOptions::default());
/// index.create("numbers.idx").unwrap();
/// index.insert(3, 30).unwrap();
/// index.insert(1, 10).unwrap();
///
/// assert_eq!(index.search(3).unwrap(), Some(30));
/// assert_eq!(index.export_all().unwrap(), vec![(1, 10), (3, 30)]);
/// index.close().unwrap();
/// ```
pub struct BTreeIndex {
    options: IndexOptions,
    tree: Option<Tree>,
}

impl BTreeIndex {
    /// Create a closed handle.
    pub fn new(options: IndexOptions) -> Self {
        Self {
            options,
            tree: None,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create (or overwrite) an index file and open it.
    ///
    /// An index that is already open is closed first.
    ///
    /// # Panics
    /// Panics if the configured cache capacity is 0.
    pub fn create<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.close()?;
        self.tree = Some(Tree::create(path.as_ref(), self.options.capacity())?);
        Ok(())
    }

    /// Open an existing index file.
    ///
    /// An index that is already open is closed first.
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be opened
    /// - `Error::InvalidFormat` if the header is short or has the wrong tag
    ///
    /// # Panics
    /// Panics if the configured cache capacity is 0.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.close()?;
        self.tree = Some(Tree::load(path.as_ref(), self.options.capacity())?);
        Ok(())
    }

    /// Write back all cached nodes and the header, then release the file.
    ///
    /// Closing a closed handle does nothing. If the write-back fails the
    /// handle stays open.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut tree) = self.tree.take() else {
            return Ok(());
        };

        if let Err(e) = tree.flush() {
            self.tree = Some(tree);
            return Err(e);
        }

        tracing::info!(
            path = %tree.cache.store().path().display(),
            root_id = tree.root_id.0,
            next_block_id = tree.next_block_id.0,
            "closed index file"
        );
        Ok(())
    }

    /// Write back all cached nodes and the header without closing.
    pub fn flush(&mut self) -> Result<()> {
        self.tree_mut()?.flush()
    }

    /// Check if an index file is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.tree.is_some()
    }

    // ========================================================================
    // Tree operations
    // ========================================================================

    /// Insert a key/value pair. Existing pairs with the same key are kept.
    pub fn insert(&mut self, key: u64, value: u64) -> Result<()> {
        self.tree_mut()?.insert(key, value)
    }

    /// Look up the value stored under `key`.
    pub fn search(&mut self, key: u64) -> Result<Option<u64>> {
        self.tree_mut()?.search(key)
    }

    /// Insert pairs in order, stopping at the first failure.
    ///
    /// Returns the number of pairs inserted. Pairs inserted before a
    /// failure stay in the tree.
    pub fn bulk_insert<I>(&mut self, pairs: I) -> Result<usize>
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let tree = self.tree_mut()?;
        let mut count = 0;
        for (key, value) in pairs {
            tree.insert(key, value)?;
            count += 1;
        }
        tracing::debug!(count, "bulk insert finished");
        Ok(count)
    }

    /// All pairs in ascending key order.
    pub fn export_all(&mut self) -> Result<Vec<(u64, u64)>> {
        let mut pairs = Vec::new();
        self.for_each(|key, value| pairs.push((key, value)))?;
        Ok(pairs)
    }

    /// Visit all pairs in ascending key order.
    pub fn for_each<F: FnMut(u64, u64)>(&mut self, mut f: F) -> Result<()> {
        self.tree_mut()?.for_each(&mut f)
    }

    /// Number of stored pairs, counted by a full traversal.
    pub fn len(&mut self) -> Result<usize> {
        let mut count = 0;
        self.for_each(|_, _| count += 1)?;
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.tree_ref()?.root_id.is_none())
    }

    /// Number of levels in the tree (0 when empty).
    pub fn height(&mut self) -> Result<usize> {
        self.tree_mut()?.height()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Root block, or `BlockId::NONE` for an empty tree.
    pub fn root_id(&self) -> Result<BlockId> {
        Ok(self.tree_ref()?.root_id)
    }

    /// Next block id the allocator will hand out.
    pub fn next_block_id(&self) -> Result<BlockId> {
        Ok(self.tree_ref()?.next_block_id)
    }

    /// Fetch a copy of a node through the cache.
    ///
    /// This counts as an access and may evict another node.
    pub fn node(&mut self, block_id: BlockId) -> Result<Node> {
        self.tree_mut()?.fetch(block_id)
    }

    /// Current cache counters.
    pub fn cache_stats(&self) -> Result<CacheStats> {
        Ok(self.tree_ref()?.cache.stats())
    }

    /// Number of nodes currently held in memory.
    pub fn cached_nodes(&self) -> Result<usize> {
        Ok(self.tree_ref()?.cache.len())
    }

    fn tree_mut(&mut self) -> Result<&mut Tree> {
        self.tree.as_mut().ok_or(Error::NotOpen)
    }

    fn tree_ref(&self) -> Result<&Tree> {
        self.tree.as_ref().ok_or(Error::NotOpen)
    }
}

impl Default for BTreeIndex {
    fn default() -> Self {
        Self::new(IndexOptions::default())
    }
}

impl Drop for BTreeIndex {
    fn drop(&mut self) {
        if let Some(tree) = self.tree.as_mut() {
            if let Err(e) = tree.flush() {
                tracing::warn!(error = %e, "failed to flush index on drop");
            }
        }
    }
}
