//! Error types for diskbtree.

use thiserror::Error;

use crate::common::BlockId;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the index.
///
/// None of these are retried internally. Blocks written before a failure
/// stay written; nothing is rolled back.
#[derive(Debug, Error)]
pub enum Error {
    /// The file is not an index file, or a buffer has the wrong size.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A block could not be read in full (truncated file or dangling pointer).
    #[error("{0} not found")]
    BlockNotFound(BlockId),

    /// The index has no open file.
    #[error("No index file is open")]
    NotOpen,

    /// I/O error from the underlying file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
