//! B-tree node and its on-disk encoding.

use crate::common::config::{BLOCK_SIZE, MAX_CHILDREN, MAX_KEYS};
use crate::common::{BlockId, Error, Result};
use crate::storage::Block;

/// A B-tree node as held in memory.
///
/// `keys` and `values` are parallel arrays; only the first `num_keys`
/// entries are significant, but the tail is preserved by the codec.
/// A node is a leaf iff every child slot is `BlockId::NONE`.
///
/// # Layout (big-endian u64 fields)
/// ```text
/// Offset  Size    Field
/// ------  ------  -----
/// 0       8       block_id
/// 8       8       parent_id
/// 16      8       num_keys
/// 24      19×8    keys
/// 176     19×8    values
/// 328     20×8    children
/// 488     24      zero padding
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub block_id: BlockId,
    /// Informational only; never followed during search or insert.
    pub parent_id: BlockId,
    pub num_keys: usize,
    pub keys: [u64; MAX_KEYS],
    pub values: [u64; MAX_KEYS],
    pub children: [BlockId; MAX_CHILDREN],
}

impl Node {
    pub const OFFSET_BLOCK_ID: usize = 0;
    pub const OFFSET_PARENT_ID: usize = 8;
    pub const OFFSET_NUM_KEYS: usize = 16;
    pub const OFFSET_KEYS: usize = 24;
    pub const OFFSET_VALUES: usize = Self::OFFSET_KEYS + 8 * MAX_KEYS;
    pub const OFFSET_CHILDREN: usize = Self::OFFSET_VALUES + 8 * MAX_KEYS;
    /// Bytes used before padding.
    pub const ENCODED_LEN: usize = Self::OFFSET_CHILDREN + 8 * MAX_CHILDREN;

    /// Create an empty leaf with the given id.
    pub fn new(block_id: BlockId) -> Self {
        Self {
            block_id,
            parent_id: BlockId::NONE,
            num_keys: 0,
            keys: [0; MAX_KEYS],
            values: [0; MAX_KEYS],
            children: [BlockId::NONE; MAX_CHILDREN],
        }
    }

    /// True if no child slot is in use.
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(BlockId::is_none)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.num_keys == MAX_KEYS
    }

    /// The significant keys.
    #[inline]
    pub fn keys(&self) -> &[u64] {
        &self.keys[..self.num_keys]
    }

    /// Number of non-zero child pointers.
    pub fn child_count(&self) -> usize {
        self.children.iter().filter(|c| !c.is_none()).count()
    }

    /// Encode into a zero-padded block.
    pub fn encode(&self) -> Block {
        let mut block = Block::new();
        block.put_u64(Self::OFFSET_BLOCK_ID, self.block_id.0);
        block.put_u64(Self::OFFSET_PARENT_ID, self.parent_id.0);
        block.put_u64(Self::OFFSET_NUM_KEYS, self.num_keys as u64);

        for (i, key) in self.keys.iter().enumerate() {
            block.put_u64(Self::OFFSET_KEYS + 8 * i, *key);
        }
        for (i, value) in self.values.iter().enumerate() {
            block.put_u64(Self::OFFSET_VALUES + 8 * i, *value);
        }
        for (i, child) in self.children.iter().enumerate() {
            block.put_u64(Self::OFFSET_CHILDREN + 8 * i, child.0);
        }

        block
    }

    /// Decode a node from exactly `BLOCK_SIZE` bytes.
    ///
    /// No field is validated; the stored `num_keys` is taken as is.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if `bytes` is not one block long.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != BLOCK_SIZE {
            return Err(Error::InvalidFormat(format!(
                "node buffer is {} bytes, expected {}",
                bytes.len(),
                BLOCK_SIZE
            )));
        }
        let block = Block::from_bytes(bytes)?;

        let num_keys = block.get_u64(Self::OFFSET_NUM_KEYS);
        let num_keys = usize::try_from(num_keys)
            .map_err(|_| Error::InvalidFormat(format!("key count {} out of range", num_keys)))?;

        let mut node = Self::new(BlockId::new(block.get_u64(Self::OFFSET_BLOCK_ID)));
        node.parent_id = BlockId::new(block.get_u64(Self::OFFSET_PARENT_ID));
        node.num_keys = num_keys;

        for i in 0..MAX_KEYS {
            node.keys[i] = block.get_u64(Self::OFFSET_KEYS + 8 * i);
            node.values[i] = block.get_u64(Self::OFFSET_VALUES + 8 * i);
        }
        for i in 0..MAX_CHILDREN {
            node.children[i] = BlockId::new(block.get_u64(Self::OFFSET_CHILDREN + 8 * i));
        }

        Ok(node)
    }
}
