//! B-tree algorithms over cached, disk-addressed nodes.
//!
//! [`Tree`] is the open state of an index: the header fields and the node
//! cache. It never touches the file except for header writes; every node
//! goes through the [`NodeCache`].

use std::path::Path;

use crate::index::btree::Node;
use crate::buffer::NodeCache;
use crate::common::config::{MAX_KEYS, MIN_DEGREE};
use crate::common::{BlockId, Error, Result};
use crate::storage::{BlockStore, FileHeader};

pub(crate) struct Tree {
    pub(crate) cache: NodeCache,
    pub(crate) root_id: BlockId,
    pub(crate) next_block_id: BlockId,
}

impl Tree {
    /// Create a fresh index file with an empty tree.
    pub(crate) fn create(path: &Path, capacity: usize) -> Result<Self> {
        let store = BlockStore::create(path)?;
        let header = FileHeader::empty();
        Ok(Self {
            cache: NodeCache::new(capacity, store),
            root_id: header.root_id,
            next_block_id: header.next_block_id,
        })
    }

    /// Open an existing index file and load its header.
    pub(crate) fn load(path: &Path, capacity: usize) -> Result<Self> {
        let mut store = BlockStore::open(path)?;
        let header = store.read_header()?;
        tracing::debug!(
            root_id = header.root_id.0,
            next_block_id = header.next_block_id.0,
            "loaded header"
        );

        Ok(Self {
            cache: NodeCache::new(capacity, store),
            root_id: header.root_id,
            next_block_id: header.next_block_id,
        })
    }

    /// Write back every cached node, then the header.
    pub(crate) fn flush(&mut self) -> Result<()> {
        self.cache.flush_all()?;
        self.write_header()
    }

    // ========================================================================
    // Insert
    // ========================================================================

    pub(crate) fn insert(&mut self, key: u64, value: u64) -> Result<()> {
        if self.root_id.is_none() {
            let mut root = Node::new(self.allocate());
            root.num_keys = 1;
            root.keys[0] = key;
            root.values[0] = value;

            self.root_id = root.block_id;
            self.cache.put(root)?;
            return self.write_header();
        }

        let mut root = self.fetch(self.root_id)?;
        if !root.is_full() {
            return self.insert_non_full(root, key, value);
        }

        // Grow the tree by one level before descending
        let mut new_root = Node::new(self.allocate());
        new_root.children[0] = root.block_id;
        self.root_id = new_root.block_id;
        self.split_child(&mut new_root, 0, &mut root)?;
        self.write_header()?;
        tracing::debug!(
            old_root = root.block_id.0,
            new_root = new_root.block_id.0,
            "split root"
        );

        self.insert_non_full(new_root, key, value)
    }

    /// Insert into the subtree rooted at `node`, which must not be full.
    fn insert_non_full(&mut self, mut node: Node, key: u64, value: u64) -> Result<()> {
        loop {
            if node.is_leaf() {
                // Shift larger keys right; equal keys stay in front
                let mut i = node.num_keys;
                while i > 0 && key < node.keys[i - 1] {
                    node.keys[i] = node.keys[i - 1];
                    node.values[i] = node.values[i - 1];
                    i -= 1;
                }
                node.keys[i] = key;
                node.values[i] = value;
                node.num_keys += 1;
                return self.cache.put(node);
            }

            let mut i = 0;
            while i < node.num_keys && node.keys[i] < key {
                i += 1;
            }

            if node.children[i].is_none() {
                let mut child = Node::new(self.allocate());
                child.parent_id = node.block_id;
                node.children[i] = child.block_id;
                tracing::debug!(
                    key,
                    parent = node.block_id.0,
                    child = child.block_id.0,
                    slot = i,
                    "materialized empty child"
                );

                self.cache.put(child.clone())?;
                self.cache.put(node)?;
                node = child;
                continue;
            }

            let mut child = self.fetch(node.children[i])?;
            if child.is_full() {
                self.split_child(&mut node, i, &mut child)?;
                if node.keys[i] < key {
                    i += 1;
                }
            }
            node = self.fetch(node.children[i])?;
        }
    }

    /// Split the full `child`, stored at `parent.children[index]`.
    ///
    /// The upper half moves into a new sibling linked at `index + 1`, and
    /// the median is promoted into `parent` at `index`. `parent` must not
    /// be full. All three nodes are written through the cache, and the
    /// caller's copies of `parent` and `child` are updated in place.
    fn split_child(&mut self, parent: &mut Node, index: usize, child: &mut Node) -> Result<()> {
        let t = MIN_DEGREE;
        debug_assert!(child.is_full());
        debug_assert!(!parent.is_full());

        let mut sibling = Node::new(self.allocate());
        sibling.parent_id = parent.block_id;
        child.parent_id = parent.block_id;

        sibling.num_keys = t - 1;
        sibling.keys[..t - 1].copy_from_slice(&child.keys[t..]);
        sibling.values[..t - 1].copy_from_slice(&child.values[t..]);
        if !child.is_leaf() {
            sibling.children[..t].copy_from_slice(&child.children[t..]);
            child.children[t..].fill(BlockId::NONE);
        }
        child.num_keys = t - 1;

        let n = parent.num_keys;
        parent.children.copy_within(index + 1..n + 1, index + 2);
        parent.children[index + 1] = sibling.block_id;
        parent.keys.copy_within(index..n, index + 1);
        parent.values.copy_within(index..n, index + 1);
        parent.keys[index] = child.keys[t - 1];
        parent.values[index] = child.values[t - 1];
        parent.num_keys += 1;

        tracing::trace!(
            parent = parent.block_id.0,
            child = child.block_id.0,
            sibling = sibling.block_id.0,
            "split node"
        );

        self.cache.put(parent.clone())?;
        self.cache.put(child.clone())?;
        self.cache.put(sibling)
    }

    // ========================================================================
    // Search and traversal
    // ========================================================================

    pub(crate) fn search(&mut self, key: u64) -> Result<Option<u64>> {
        if self.root_id.is_none() {
            return Ok(None);
        }

        let mut node = self.fetch(self.root_id)?;
        loop {
            let mut i = 0;
            while i < node.num_keys && key > node.keys[i] {
                i += 1;
            }

            if i < node.num_keys && key == node.keys[i] {
                return Ok(Some(node.values[i]));
            }
            if node.is_leaf() || node.children[i].is_none() {
                return Ok(None);
            }
            node = self.fetch(node.children[i])?;
        }
    }

    /// Visit every pair in key order.
    pub(crate) fn for_each<F: FnMut(u64, u64)>(&mut self, f: &mut F) -> Result<()> {
        if self.root_id.is_none() {
            return Ok(());
        }
        self.walk(self.root_id, f)
    }

    // Recursion depth is the tree height.
    fn walk<F: FnMut(u64, u64)>(&mut self, block_id: BlockId, f: &mut F) -> Result<()> {
        let node = self.fetch(block_id)?;

        for i in 0..node.num_keys {
            if !node.children[i].is_none() {
                self.walk(node.children[i], f)?;
            }
            f(node.keys[i], node.values[i]);
        }

        let last = node.children[node.num_keys];
        if !last.is_none() {
            self.walk(last, f)?;
        }
        Ok(())
    }

    /// Number of levels, following the leftmost path.
    pub(crate) fn height(&mut self) -> Result<usize> {
        let mut height = 0;
        let mut cursor = self.root_id;
        while !cursor.is_none() {
            height += 1;
            cursor = self.fetch(cursor)?.children[0];
        }
        Ok(height)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Fetch a node through the cache, rejecting impossible key counts.
    pub(crate) fn fetch(&mut self, block_id: BlockId) -> Result<Node> {
        let node = self.cache.get(block_id)?;
        if node.num_keys > MAX_KEYS {
            return Err(Error::InvalidFormat(format!(
                "{} holds {} keys, at most {} allowed",
                block_id, node.num_keys, MAX_KEYS
            )));
        }
        Ok(node)
    }

    fn allocate(&mut self) -> BlockId {
        let id = self.next_block_id;
        self.next_block_id = id.next();
        id
    }

    fn write_header(&mut self) -> Result<()> {
        let header = FileHeader {
            root_id: self.root_id,
            next_block_id: self.next_block_id,
        };
        self.cache.store_mut().write_header(&header)
    }
}
