//! Eviction policy implementations (replacers).
//!
//! - [`LruReplacer`] - Least recently used, backed by an intrusive list

mod lru;

pub use lru::LruReplacer;
