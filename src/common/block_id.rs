//! Block identifier type.

use std::fmt;

use crate::common::config::BLOCK_SIZE;

/// Identifies a block in the index file.
///
/// A node's id is also its position in the file: block N starts at byte
/// `N × BLOCK_SIZE`. Block 0 holds the header, so `BlockId(0)` doubles as
/// the "no block" marker in child pointers and in the header's root slot.
///
/// # Example
/// ```
/// use diskbtree::BlockId;
///
/// let id = BlockId::new(3);
/// assert!(!id.is_none());
/// assert_eq!(id.offset(), Some(1536));
/// assert!(BlockId::NONE.is_none());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl BlockId {
    /// The header block, and the "no child" / "empty tree" sentinel.
    pub const NONE: BlockId = BlockId(0);

    /// First id handed out to a node.
    pub const FIRST: BlockId = BlockId(1);

    /// Create a new BlockId.
    #[inline]
    pub fn new(id: u64) -> Self {
        BlockId(id)
    }

    /// Check if this id is the sentinel.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Byte offset of this block in the file, or `None` on overflow.
    #[inline]
    pub fn offset(&self) -> Option<u64> {
        self.0.checked_mul(BLOCK_SIZE as u64)
    }

    /// The id following this one.
    #[inline]
    pub fn next(&self) -> BlockId {
        BlockId(self.0 + 1)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Block(NONE)")
        } else {
            write!(f, "Block({})", self.0)
        }
    }
}
