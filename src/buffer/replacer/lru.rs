//! LRU (Least Recently Used) replacement policy.
//!
//! Recency is kept in an intrusive doubly linked list whose links live in a
//! slab (`Vec`), with a `HashMap` from block id to slab slot. Every
//! operation is O(1).

use std::collections::HashMap;

use crate::common::BlockId;

/// One entry of the recency list.
#[derive(Debug, Clone, Copy)]
struct Link {
    block_id: BlockId,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Tracks access order of resident blocks.
///
/// ```text
///  head (LRU)                                tail (MRU)
///     │                                          │
///     ▼                                          ▼
///  [Block 4] ⇄ [Block 1] ⇄ [Block 7] ⇄ ... ⇄ [Block 2]
/// ```
pub struct LruReplacer {
    /// Slab of links; freed slots are recycled through `free`.
    slots: Vec<Link>,

    /// Slots available for reuse.
    free: Vec<usize>,

    /// Block id to slot in `slots`.
    index: HashMap<BlockId, usize>,

    /// Least recently used.
    head: Option<usize>,

    /// Most recently used.
    tail: Option<usize>,
}

impl LruReplacer {
    /// Create an empty replacer.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    /// Record an access, making `block_id` the most recently used.
    ///
    /// Unknown ids are added at the MRU end.
    pub fn record_access(&mut self, block_id: BlockId) {
        if let Some(&slot) = self.index.get(&block_id) {
            if self.tail != Some(slot) {
                self.unlink(slot);
                self.push_back(slot);
            }
            return;
        }

        let link = Link {
            block_id,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = link;
                slot
            }
            None => {
                self.slots.push(link);
                self.slots.len() - 1
            }
        };

        self.index.insert(block_id, slot);
        self.push_back(slot);
    }

    /// The least recently used block, without removing it.
    pub fn victim(&self) -> Option<BlockId> {
        self.head.map(|slot| self.slots[slot].block_id)
    }

    /// Remove and return the least recently used block.
    pub fn evict(&mut self) -> Option<BlockId> {
        let block_id = self.victim()?;
        self.remove(block_id);
        Some(block_id)
    }

    /// Forget a block. Unknown ids are ignored.
    pub fn remove(&mut self, block_id: BlockId) {
        if let Some(slot) = self.index.remove(&block_id) {
            self.unlink(slot);
            self.free.push(slot);
        }
    }

    /// Block ids from least to most recently used.
    pub fn order(&self) -> Vec<BlockId> {
        let mut order = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            order.push(self.slots[slot].block_id);
            cursor = self.slots[slot].next;
        }
        order
    }

    /// Number of tracked blocks.
    pub fn size(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Detach `slot` from the list, fixing up neighbours and ends.
    fn unlink(&mut self, slot: usize) {
        let Link { prev, next, .. } = self.slots[slot];

        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }

        self.slots[slot].prev = None;
        self.slots[slot].next = None;
    }

    /// Attach a detached `slot` at the MRU end.
    fn push_back(&mut self, slot: usize) {
        self.slots[slot].prev = self.tail;
        self.slots[slot].next = None;

        match self.tail {
            Some(t) => self.slots[t].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }
}

impl Default for LruReplacer {
    fn default() -> Self {
        Self::new()
    }
}
