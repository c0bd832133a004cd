//! Block - the fixed 512-byte unit of storage.

use crate::common::config::BLOCK_SIZE;
use crate::common::{Error, Result};

/// A block of data (512 bytes, 512-aligned).
///
/// This is the unit of I/O between the index file and memory. Nodes and
/// the file header are encoded into blocks before they are written.
///
/// # Example
/// ```
/// use diskbtree::storage::Block;
///
/// let block = Block::from_bytes(b"abc").unwrap();
/// assert_eq!(&block.as_slice()[..3], b"abc");
/// assert_eq!(block.as_slice()[3], 0);
/// ```
#[repr(align(512))]
pub struct Block {
    data: [u8; BLOCK_SIZE],
}

impl Block {
    /// Create a new zeroed block.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; BLOCK_SIZE],
        }
    }

    /// Build a block from a buffer of at most `BLOCK_SIZE` bytes.
    ///
    /// Shorter buffers are zero-padded.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if `bytes` is longer than a block.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > BLOCK_SIZE {
            return Err(Error::InvalidFormat(format!(
                "buffer of {} bytes exceeds block size {}",
                bytes.len(),
                BLOCK_SIZE
            )));
        }

        let mut block = Self::new();
        block.data[..bytes.len()].copy_from_slice(bytes);
        Ok(block)
    }

    /// Get immutable slice of block data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of block data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Read a big-endian u64 at `offset`.
    ///
    /// # Panics
    /// Panics if `offset + 8 > BLOCK_SIZE`.
    #[inline]
    pub fn get_u64(&self, offset: usize) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.data[offset..offset + 8]);
        u64::from_be_bytes(buf)
    }

    /// Write a big-endian u64 at `offset`.
    ///
    /// # Panics
    /// Panics if `offset + 8 > BLOCK_SIZE`.
    #[inline]
    pub fn put_u64(&mut self, offset: usize, value: u64) {
        self.data[offset..offset + 8].copy_from_slice(&value.to_be_bytes());
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_size_and_alignment() {
        assert_eq!(std::mem::size_of::<Block>(), BLOCK_SIZE);
        assert_eq!(std::mem::align_of::<Block>(), 512);
    }

    #[test]
    fn test_block_new_is_zeroed() {
        let block = Block::new();
        assert!(block.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_bytes_pads_short_buffer() {
        let block = Block::from_bytes(&[0xAB; 10]).unwrap();
        assert_eq!(block.as_slice()[9], 0xAB);
        assert_eq!(block.as_slice()[10], 0);
        assert_eq!(block.as_slice()[BLOCK_SIZE - 1], 0);
    }

    #[test]
    fn test_from_bytes_rejects_long_buffer() {
        let result = Block::from_bytes(&[0u8; BLOCK_SIZE + 1]);
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_u64_is_big_endian() {
        let mut block = Block::new();
        block.put_u64(8, 0x0102_0304_0506_0708);

        assert_eq!(&block.as_slice()[8..16], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(block.get_u64(8), 0x0102_0304_0506_0708);
    }
}
