//! File header stored in block 0.

use crate::common::config::MAGIC;
use crate::common::{BlockId, Error, Result};
use crate::storage::Block;

/// Tree bookkeeping stored at the start of the file.
///
/// # Layout (block 0)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       8     magic ("4337PRJ3")
/// 8       8     root_id (big-endian)
/// 16      8     next_block_id (big-endian)
/// 24      488   zero padding
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Root node, or `BlockId::NONE` for an empty tree.
    pub root_id: BlockId,
    /// Next id the allocator will hand out.
    pub next_block_id: BlockId,
}

impl FileHeader {
    pub const OFFSET_MAGIC: usize = 0;
    pub const OFFSET_ROOT_ID: usize = 8;
    pub const OFFSET_NEXT_BLOCK_ID: usize = 16;

    /// Header of a freshly created, empty index.
    pub fn empty() -> Self {
        Self {
            root_id: BlockId::NONE,
            next_block_id: BlockId::FIRST,
        }
    }

    /// Decode and validate a header block.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if the magic tag does not match.
    pub fn from_block(block: &Block) -> Result<Self> {
        let data = block.as_slice();
        let magic = &data[Self::OFFSET_MAGIC..Self::OFFSET_MAGIC + MAGIC.len()];
        if magic != MAGIC {
            return Err(Error::InvalidFormat(format!(
                "bad magic tag {:?}",
                String::from_utf8_lossy(magic)
            )));
        }

        Ok(Self {
            root_id: BlockId::new(block.get_u64(Self::OFFSET_ROOT_ID)),
            next_block_id: BlockId::new(block.get_u64(Self::OFFSET_NEXT_BLOCK_ID)),
        })
    }

    /// Encode the header into a zero-padded block.
    pub fn to_block(&self) -> Block {
        let mut block = Block::new();
        block.as_mut_slice()[Self::OFFSET_MAGIC..Self::OFFSET_MAGIC + MAGIC.len()]
            .copy_from_slice(&MAGIC);
        block.put_u64(Self::OFFSET_ROOT_ID, self.root_id.0);
        block.put_u64(Self::OFFSET_NEXT_BLOCK_ID, self.next_block_id.0);
        block
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::empty()
    }
}
