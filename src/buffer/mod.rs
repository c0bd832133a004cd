//! Node cache management.
//!
//! The node cache is the in-memory layer between the B-tree engine and
//! disk. It keeps a bounded number of decoded nodes and writes each one
//! back before it is dropped.
//!
//! # Components
//! - [`NodeCache`] - The write-back LRU cache
//! - [`CacheStats`] - Hit/miss/eviction counters
//! - [`replacer`] - Eviction policy implementations

mod node_cache;
pub mod replacer;
mod stats;

pub use node_cache::NodeCache;
pub use stats::CacheStats;
