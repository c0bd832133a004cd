//! Index structures.

pub mod btree;

pub use btree::{BTreeIndex, Node};
