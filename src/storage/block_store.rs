//! Block Store - fixed-size block I/O against a single index file.
//!
//! The [`BlockStore`] handles all direct file operations:
//! - Reading and writing blocks by id
//! - Reading and writing the header block
//! - Creating and opening the index file

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::config::BLOCK_SIZE;
use crate::common::{BlockId, Error, Result};
use crate::storage::{Block, FileHeader};

/// Owns the file handle of one index file.
///
/// # File Layout
/// ```text
/// ┌──────────┬──────────┬──────────┬─────────┬──────────┐
/// │ Block 0  │ Block 1  │ Block 2  │  ...    │ Block N  │
/// │ (header) │ (node)   │ (node)   │         │ (node)   │
/// └──────────┴──────────┴──────────┴─────────┴──────────┘
/// Offset:  0       512       1024     ...     N×512
/// ```
///
/// # Durability
/// Every write is followed by `fsync()`. There is no batching and no
/// multi-block atomicity: a crash between two writes leaves whatever was
/// already synced on disk.
pub struct BlockStore {
    file: File,
    path: PathBuf,
}

impl BlockStore {
    /// Create (or truncate) an index file and write an empty header.
    ///
    /// Confirming that an existing file may be overwritten is the caller's job.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut store = Self {
            file,
            path: path.to_path_buf(),
        };
        store.write_header(&FileHeader::empty())?;

        tracing::info!(path = %path.display(), "created index file");
        Ok(store)
    }

    /// Open an existing index file.
    ///
    /// The header is not validated here; call [`read_header`](Self::read_header).
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        tracing::info!(path = %path.display(), "opened index file");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Read a block from disk.
    ///
    /// # Errors
    /// Returns `Error::BlockNotFound` if the file ends before the block does.
    pub fn read_block(&mut self, block_id: BlockId) -> Result<Block> {
        let offset = block_id.offset().ok_or(Error::BlockNotFound(block_id))?;
        self.file.seek(SeekFrom::Start(offset))?;

        let mut block = Block::new();
        match self.file.read_exact(block.as_mut_slice()) {
            Ok(()) => Ok(block),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(Error::BlockNotFound(block_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a block to disk and sync it.
    ///
    /// Writing past the end of the file extends it.
    pub fn write_block(&mut self, block_id: BlockId, block: &Block) -> Result<()> {
        let offset = block_id.offset().ok_or(Error::BlockNotFound(block_id))?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(block.as_slice())?;
        self.file.sync_all()?; // fsync for durability

        tracing::trace!(%block_id, "wrote block");
        Ok(())
    }

    /// Write a raw buffer of at most `BLOCK_SIZE` bytes, zero-padded.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if `bytes` is longer than a block.
    pub fn write_bytes(&mut self, block_id: BlockId, bytes: &[u8]) -> Result<()> {
        let block = Block::from_bytes(bytes)?;
        self.write_block(block_id, &block)
    }

    /// Read and validate the header block.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` on a short file or a magic mismatch.
    pub fn read_header(&mut self) -> Result<FileHeader> {
        let block = match self.read_block(BlockId::NONE) {
            Ok(block) => block,
            Err(Error::BlockNotFound(_)) => {
                return Err(Error::InvalidFormat(format!(
                    "header shorter than {} bytes",
                    BLOCK_SIZE
                )))
            }
            Err(e) => return Err(e),
        };
        FileHeader::from_block(&block)
    }

    /// Write the header block and sync it.
    pub fn write_header(&mut self, header: &FileHeader) -> Result<()> {
        self.write_block(BlockId::NONE, &header.to_block())?;
        tracing::debug!(
            root_id = header.root_id.0,
            next_block_id = header.next_block_id.0,
            "wrote header"
        );
        Ok(())
    }

    /// Number of whole blocks currently in the file.
    pub fn block_count(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len() / BLOCK_SIZE as u64)
    }

    /// Path of the underlying file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
