//! Node Cache - the bounded write-back layer between the tree and disk.
//!
//! The [`NodeCache`] provides:
//! - Node caching between disk and memory
//! - Least-recently-used eviction with synchronous write-back
//! - Explicit flush on load and close

use std::collections::HashMap;

use crate::index::btree::Node;
use crate::buffer::replacer::LruReplacer;
use crate::buffer::CacheStats;
use crate::common::{BlockId, Error, Result};
use crate::storage::BlockStore;

/// Keeps at most `capacity` decoded nodes in memory.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │                     NodeCache                       │
/// │  ┌──────────────────┐   ┌────────────────────────┐  │
/// │  │      nodes       │   │        replacer        │  │
/// │  │ BlockId → Node   │   │ LruReplacer (recency)  │  │
/// │  └──────────────────┘   └────────────────────────┘  │
/// │                 ┌──────────────┐                    │
/// │                 │  BlockStore  │                    │
/// │                 └──────────────┘                    │
/// └─────────────────────────────────────────────────────┘
/// ```
///
/// # Write-back
/// Every resident node is treated as dirty. When an insertion pushes the
/// cache over capacity, the least recently used entry is written through
/// the [`BlockStore`] and then dropped. A node that fails to write stays
/// resident, leaving the cache over capacity; the next insertion evicts
/// until it is back within bounds.
///
/// # Ownership
/// [`get`](Self::get) hands out a copy. Callers that mutate it must hand
/// it back with [`put`](Self::put).
pub struct NodeCache {
    /// Resident nodes.
    nodes: HashMap<BlockId, Node>,

    /// Access order of resident nodes.
    replacer: LruReplacer,

    /// Handles all disk I/O.
    store: BlockStore,

    stats: CacheStats,

    /// Maximum number of resident nodes (immutable after construction).
    capacity: usize,
}

impl NodeCache {
    /// Create a new node cache over `store`.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize, store: BlockStore) -> Self {
        assert!(capacity > 0, "cache capacity must be > 0");

        Self {
            nodes: HashMap::with_capacity(capacity.saturating_add(1).min(1024)),
            replacer: LruReplacer::new(),
            store,
            stats: CacheStats::default(),
            capacity,
        }
    }

    // ========================================================================
    // Public API: Access nodes
    // ========================================================================

    /// Fetch a node, loading it from disk on a miss.
    ///
    /// The node becomes the most recently used entry. A miss may evict
    /// the least recently used entry.
    ///
    /// # Errors
    /// - `Error::BlockNotFound` for `BlockId::NONE` or a block past the end of file
    /// - `Error::InvalidFormat` if the stored block id differs from `block_id`
    /// - I/O errors from the load or from the eviction write-back
    pub fn get(&mut self, block_id: BlockId) -> Result<Node> {
        if block_id.is_none() {
            return Err(Error::BlockNotFound(block_id));
        }

        if let Some(node) = self.nodes.get(&block_id) {
            // Cache hit!
            let node = node.clone();
            self.replacer.record_access(block_id);
            self.stats.hits += 1;
            return Ok(node);
        }

        // Cache miss: load from disk
        self.stats.misses += 1;
        let block = self.store.read_block(block_id)?;
        self.stats.blocks_read += 1;
        let node = Node::decode(block.as_slice())?;
        if node.block_id != block_id {
            return Err(Error::InvalidFormat(format!(
                "{} claims to be {}",
                block_id, node.block_id
            )));
        }
        tracing::trace!(%block_id, "loaded node");

        self.insert(block_id, node.clone())?;
        Ok(node)
    }

    /// Insert or refresh a node as the most recently used entry.
    ///
    /// # Errors
    /// I/O errors from the eviction write-back.
    pub fn put(&mut self, node: Node) -> Result<()> {
        self.insert(node.block_id, node)
    }

    /// Write every resident node to disk and empty the cache.
    ///
    /// Nodes are written least recently used first. On failure, nodes
    /// not yet written stay resident.
    ///
    /// # Errors
    /// I/O errors from the writes.
    pub fn flush_all(&mut self) -> Result<()> {
        let order = self.replacer.order();
        let count = order.len();

        for block_id in order {
            if let Some(node) = self.nodes.get(&block_id) {
                Self::write_node(&mut self.store, &mut self.stats, node)?;
            }
            self.nodes.remove(&block_id);
            self.replacer.remove(block_id);
        }

        debug_assert!(self.nodes.is_empty());
        self.replacer.clear();
        tracing::debug!(count, "flushed node cache");
        Ok(())
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Maximum number of resident nodes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether a node is resident, without touching recency.
    pub fn contains(&self, block_id: BlockId) -> bool {
        self.nodes.contains_key(&block_id)
    }

    /// Resident block ids, least recently used first.
    pub fn resident(&self) -> Vec<BlockId> {
        self.replacer.order()
    }

    /// Access the underlying store (header I/O bypasses the cache).
    pub fn store_mut(&mut self) -> &mut BlockStore {
        &mut self.store
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    // ========================================================================
    // Internal: Insertion and eviction
    // ========================================================================

    fn insert(&mut self, block_id: BlockId, node: Node) -> Result<()> {
        debug_assert_eq!(block_id, node.block_id);

        self.nodes.insert(block_id, node);
        self.replacer.record_access(block_id);

        while self.nodes.len() > self.capacity {
            self.evict()?;
        }
        Ok(())
    }

    /// Write back and drop the least recently used node.
    fn evict(&mut self) -> Result<()> {
        let Some(victim) = self.replacer.victim() else {
            return Ok(());
        };

        if let Some(node) = self.nodes.get(&victim) {
            Self::write_node(&mut self.store, &mut self.stats, node)?;
        }

        self.nodes.remove(&victim);
        self.replacer.remove(victim);
        self.stats.evictions += 1;
        tracing::trace!(%victim, "evicted node");
        Ok(())
    }

    fn write_node(store: &mut BlockStore, stats: &mut CacheStats, node: &Node) -> Result<()> {
        store.write_block(node.block_id, &node.encode())?;
        stats.blocks_written += 1;
        Ok(())
    }
}
