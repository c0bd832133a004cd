//! diskbtree - a single-file, disk-backed B-tree index.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           diskbtree                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               B-Tree Engine (index/btree/)               │   │
//! │  │     BTreeIndex: insert, split, search, traversal         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Node Cache (buffer/)                       │   │
//! │  │   NodeCache + LruReplacer: bounded, write-back on evict  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Storage Layer (storage/)                   │   │
//! │  │      BlockStore + Block + FileHeader (512-byte blocks)   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, Error, config)
//! - [`storage`] - Block I/O and the file header
//! - [`buffer`] - Node cache and eviction policy
//! - [`index`] - Node codec and the B-tree engine
//!
//! # Quick Start
//! ```no_run
//! use diskbtree::{BTreeIndex, IndexOptions};
//!
//! let mut index = BTreeIndex::new(IndexOptions::default());
//! index.create("my_index.idx").unwrap();
//! index.bulk_insert([(2, 20), (1, 10)]).unwrap();
//! assert_eq!(index.search(2).unwrap(), Some(20));
//! index.close().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{IndexOptions, BLOCK_SIZE, MAX_CHILDREN, MAX_KEYS, MIN_DEGREE};
pub use common::{BlockId, Error, Result};

pub use buffer::{CacheStats, NodeCache};
pub use index::{BTreeIndex, Node};
pub use storage::{Block, BlockStore, FileHeader};
