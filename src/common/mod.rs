//! Common types and utilities shared across diskbtree.
//!
//! - Configuration constants and [`IndexOptions`](config::IndexOptions)
//! - Error types
//! - [`BlockId`]

mod block_id;
pub mod config;
pub mod error;

pub use block_id::BlockId;
pub use error::{Error, Result};
