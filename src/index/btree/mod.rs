//! B-tree index.
//!
//! - [`BTreeIndex`] - Open/close lifecycle and the public tree operations
//! - [`Node`] - In-memory node and its block encoding
//!
//! Nodes hold between `MIN_DEGREE − 1` and `2 × MIN_DEGREE − 1` keys
//! (the root may hold fewer). Full nodes are split on the way down, so an
//! insert never has to walk back up the tree.

mod index;
mod node;
mod tree;

pub use index::BTreeIndex;
pub use node::Node;
