//! Integration tests for the B-tree index.
//!
//! These tests drive the public API end to end and inspect the file and
//! the node layout the engine produces.

use diskbtree::{BTreeIndex, BlockId, Error, IndexOptions, BLOCK_SIZE, MAX_KEYS};
use tempfile::tempdir;

fn create_index(path: &std::path::Path) -> BTreeIndex {
    let mut index = BTreeIndex::new(IndexOptions::default());
    index.create(path).unwrap();
    index
}

/// Walk the tree from the root and check node-level invariants.
///
/// Returns the number of keys found.
fn check_invariants(index: &mut BTreeIndex) -> usize {
    let root = index.root_id().unwrap();
    if root.is_none() {
        return 0;
    }
    check_subtree(index, root, None, None)
}

fn check_subtree(index: &mut BTreeIndex, id: BlockId, lo: Option<u64>, hi: Option<u64>) -> usize {
    let node = index.node(id).unwrap();
    assert_eq!(node.block_id, id);
    assert!(node.num_keys <= MAX_KEYS);

    let keys = node.keys().to_vec();
    assert!(keys.windows(2).all(|w| w[0] <= w[1]), "{id} keys unsorted");
    for &key in &keys {
        assert!(lo.map_or(true, |lo| key >= lo), "{id} key {key} below bound");
        assert!(hi.map_or(true, |hi| key <= hi), "{id} key {key} above bound");
    }

    if node.is_leaf() {
        return keys.len();
    }

    assert_eq!(node.child_count(), node.num_keys + 1, "{id} child count");
    let mut total = keys.len();
    for i in 0..=node.num_keys {
        let child_lo = if i == 0 { lo } else { Some(keys[i - 1]) };
        let child_hi = if i == node.num_keys { hi } else { Some(keys[i]) };
        total += check_subtree(index, node.children[i], child_lo, child_hi);
    }
    total
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_be_bytes(buf)
}

// ============================================================================
// Scenarios
// ============================================================================

/// A new file holds only the header block.
#[test]
fn test_create_writes_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.idx");
    let index = create_index(&path);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), BLOCK_SIZE);
    assert_eq!(&bytes[0..8], b"4337PRJ3");
    assert_eq!(read_u64(&bytes, 8), 0);
    assert_eq!(read_u64(&bytes, 16), 1);
    assert!(bytes[24..].iter().all(|&b| b == 0));

    assert_eq!(index.root_id().unwrap(), BlockId::NONE);
    assert_eq!(index.next_block_id().unwrap(), BlockId::new(1));
}

/// Nineteen keys fit in the root leaf.
#[test]
fn test_single_leaf_root() {
    let dir = tempdir().unwrap();
    let mut index = create_index(&dir.path().join("b.idx"));

    for key in 1..=19 {
        index.insert(key, key * 10).unwrap();
    }

    assert_eq!(index.root_id().unwrap(), BlockId::new(1));
    let root = index.node(BlockId::new(1)).unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.num_keys, 19);
    assert_eq!(root.keys(), (1..=19u64).collect::<Vec<_>>().as_slice());
    assert_eq!(index.height().unwrap(), 1);
}

/// The twentieth key splits the root.
#[test]
fn test_root_split() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("c.idx");
    let mut index = create_index(&path);

    for key in 1..=20 {
        index.insert(key, key * 10).unwrap();
    }

    assert_eq!(index.root_id().unwrap(), BlockId::new(2));
    assert_eq!(index.height().unwrap(), 2);

    let root = index.node(BlockId::new(2)).unwrap();
    assert_eq!(root.keys(), &[10]);
    assert_eq!(root.values[0], 100);
    assert_eq!(root.children[0], BlockId::new(1));
    assert_eq!(root.children[1], BlockId::new(3));

    let left = index.node(BlockId::new(1)).unwrap();
    assert_eq!(left.num_keys, 9);
    assert_eq!(left.keys(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);

    // Nine keys from the split, then 20 lands here
    let right = index.node(BlockId::new(3)).unwrap();
    assert_eq!(right.keys(), (11..=20u64).collect::<Vec<_>>().as_slice());

    index.close().unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(read_u64(&bytes, 8), 2);
    assert_eq!(read_u64(&bytes, 16), 4);
    assert_eq!(bytes.len(), 4 * BLOCK_SIZE);
}

/// Duplicate keys are both kept; search finds the first one.
#[test]
fn test_duplicate_keys_retained() {
    let dir = tempdir().unwrap();
    let mut index = create_index(&dir.path().join("d.idx"));

    index.insert(5, 100).unwrap();
    index.insert(5, 200).unwrap();

    assert_eq!(index.export_all().unwrap(), vec![(5, 100), (5, 200)]);
    assert_eq!(index.search(5).unwrap(), Some(100));
    assert_eq!(index.search(5).unwrap(), Some(100));
}

#[test]
fn test_export_sorted() {
    let dir = tempdir().unwrap();
    let mut index = create_index(&dir.path().join("e.idx"));

    index.bulk_insert([(3, 30), (1, 10), (2, 20)]).unwrap();

    assert_eq!(index.export_all().unwrap(), vec![(1, 10), (2, 20), (3, 30)]);
}

// ============================================================================
// Durability
// ============================================================================

#[test]
fn test_reopen_finds_every_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("durable.idx");
    // 7919 is coprime with 1000, so this visits every key once
    let keys: Vec<u64> = (0..1000u64).map(|i| (i * 7919) % 1000).collect();

    {
        let mut index = create_index(&path);
        for &key in &keys {
            index.insert(key, key + 1_000_000).unwrap();
        }
        index.close().unwrap();
    }

    let mut index = BTreeIndex::default();
    index.open(&path).unwrap();
    for &key in &keys {
        assert_eq!(index.search(key).unwrap(), Some(key + 1_000_000));
    }
    assert_eq!(index.search(1000).unwrap(), None);
    assert_eq!(check_invariants(&mut index), 1000);
}

/// Inserting after a reopen must not reuse block ids.
#[test]
fn test_insert_after_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("grow.idx");

    {
        let mut index = create_index(&path);
        index.bulk_insert((0..300).map(|k| (k * 2, k))).unwrap();
        index.close().unwrap();
    }

    {
        let mut index = BTreeIndex::default();
        index.open(&path).unwrap();
        index.bulk_insert((0..300).map(|k| (k * 2 + 1, k))).unwrap();
        index.close().unwrap();
    }

    let mut index = BTreeIndex::default();
    index.open(&path).unwrap();
    let pairs = index.export_all().unwrap();
    assert_eq!(pairs.len(), 600);
    assert!(pairs.iter().map(|&(k, _)| k).eq(0..600u64));
    assert_eq!(check_invariants(&mut index), 600);
}

#[test]
fn test_open_rejects_foreign_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("foreign.bin");
    std::fs::write(&path, b"not an index file at all").unwrap();

    let mut index = BTreeIndex::default();
    assert!(matches!(index.open(&path), Err(Error::InvalidFormat(_))));
}

#[test]
fn test_open_missing_file() {
    let dir = tempdir().unwrap();
    let mut index = BTreeIndex::default();
    assert!(matches!(
        index.open(dir.path().join("missing.idx")),
        Err(Error::Io(_))
    ));
}

/// A root pointing past the end of the file surfaces as a missing block.
#[test]
fn test_dangling_root() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dangling.idx");
    drop(create_index(&path));

    let mut bytes = std::fs::read(&path).unwrap();
    bytes[8..16].copy_from_slice(&9u64.to_be_bytes());
    std::fs::write(&path, bytes).unwrap();

    let mut index = BTreeIndex::default();
    index.open(&path).unwrap();
    assert!(matches!(
        index.search(1),
        Err(Error::BlockNotFound(id)) if id == BlockId::new(9)
    ));
}

/// A node block carrying another block's id is refused, and the refused
/// insert leaves the file untouched.
#[test]
fn test_misplaced_node_rejects_insert() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("misplaced.idx");
    {
        let mut index = create_index(&path);
        index.insert(1, 10).unwrap();
        index.close().unwrap();
    }

    let mut bytes = std::fs::read(&path).unwrap();
    bytes[BLOCK_SIZE..BLOCK_SIZE + 8].copy_from_slice(&7u64.to_be_bytes());
    std::fs::write(&path, &bytes).unwrap();

    {
        let mut index = BTreeIndex::default();
        index.open(&path).unwrap();
        assert!(matches!(index.insert(2, 20), Err(Error::InvalidFormat(_))));
        assert!(matches!(index.search(1), Err(Error::InvalidFormat(_))));
        index.close().unwrap();
    }

    assert_eq!(std::fs::read(&path).unwrap(), bytes);
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_invariants_descending_inserts() {
    let dir = tempdir().unwrap();
    let mut index = create_index(&dir.path().join("desc.idx"));

    for key in (0..2000).rev() {
        index.insert(key, key).unwrap();
    }

    assert_eq!(check_invariants(&mut index), 2000);
    assert_eq!(index.height().unwrap(), 3);
    assert_eq!(index.len().unwrap(), 2000);
}

#[test]
fn test_invariants_with_many_duplicates() {
    let dir = tempdir().unwrap();
    let mut index = create_index(&dir.path().join("dups.idx"));

    for i in 0..500u64 {
        index.insert(i % 7, i).unwrap();
    }

    assert_eq!(check_invariants(&mut index), 500);
    let pairs = index.export_all().unwrap();
    assert!(pairs.windows(2).all(|w| w[0].0 <= w[1].0));
    for key in 0..7 {
        let value = index.search(key).unwrap().unwrap();
        assert_eq!(value % 7, key);
    }
}

#[test]
fn test_stats_track_cache_traffic() {
    let dir = tempdir().unwrap();
    let mut index = create_index(&dir.path().join("stats.idx"));

    index.bulk_insert((0..200).map(|k| (k, k))).unwrap();
    let stats = index.cache_stats().unwrap();

    assert!(stats.hits > 0);
    assert!(stats.evictions > 0);
    assert_eq!(stats.blocks_written, stats.evictions);
    assert!(index.cached_nodes().unwrap() <= 3);
}
