//! Storage layer - block I/O and the file header.
//!
//! This module handles persistent storage:
//! - [`BlockStore`] - Low-level file I/O
//! - [`Block`] - The raw 512-byte unit of I/O
//! - [`FileHeader`] - Tree bookkeeping in block 0

mod block;
mod block_store;
mod header;

pub use block::Block;
pub use block_store::BlockStore;
pub use header::FileHeader;
