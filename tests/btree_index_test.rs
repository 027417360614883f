//! End-to-end B+Tree index tests.
//!
//! These tests exercise the full stack (tree manager, node codec, disk
//! manager) through the public API: multi-level trees, ordered scans
//! across leaf boundaries, and persistence across close/reopen.

use burrowdb::{BTreeIndex, Error, IndexCursor, LeafNode, RecordId};
use tempfile::tempdir;

fn open_tree(dir: &tempfile::TempDir) -> BTreeIndex {
    BTreeIndex::open(dir.path().join("test.idx")).unwrap()
}

fn rid(n: u32) -> RecordId {
    RecordId::new(n, n.wrapping_mul(3))
}

/// Collect (key, rid) pairs by scanning forward from `cursor` until the
/// chain runs out.
fn scan_from(tree: &mut BTreeIndex, mut cursor: IndexCursor) -> Vec<(i32, RecordId)> {
    let mut out = Vec::new();
    loop {
        match tree.read_forward(cursor) {
            Ok((key, r, next)) => {
                out.push((key, r));
                cursor = next;
            }
            Err(Error::CursorExhausted) => return out,
            Err(e) => panic!("scan failed: {e}"),
        }
    }
}

// ============================================================================
// Sequential insert scenario (keys 1..=2000)
// ============================================================================

#[test]
fn test_two_thousand_sequential_inserts() {
    let dir = tempdir().unwrap();
    let mut tree = open_tree(&dir);

    for key in 1..=2000 {
        tree.insert(key, rid(key as u32)).unwrap();
    }

    // 2000 entries no longer fit in one leaf
    assert!(tree.height() >= 2);

    // Point lookup in the middle
    let (cursor, exact) = tree.locate(1000).unwrap();
    assert!(exact);
    let (key, r, _) = tree.read_forward(cursor).unwrap();
    assert_eq!(key, 1000);
    assert_eq!(r, rid(1000));

    // Range scan from 5 enumerates 5..=2000 in order, no gaps, no repeats
    let (cursor, exact) = tree.locate(5).unwrap();
    assert!(exact);
    let scanned = scan_from(&mut tree, cursor);
    assert_eq!(scanned.len(), 1996);
    for (i, &(key, r)) in scanned.iter().enumerate() {
        assert_eq!(key, 5 + i as i32);
        assert_eq!(r, rid(key as u32));
    }
}

#[test]
fn test_descending_inserts_read_back_ascending() {
    let dir = tempdir().unwrap();
    let mut tree = open_tree(&dir);

    for key in (1..=100).rev() {
        tree.insert(key, rid(key as u32)).unwrap();
    }

    let (cursor, exact) = tree.locate(1).unwrap();
    assert!(exact);
    let scanned = scan_from(&mut tree, cursor);

    let keys: Vec<i32> = scanned.iter().map(|&(k, _)| k).collect();
    assert_eq!(keys, (1..=100).collect::<Vec<i32>>());
    for &(key, r) in &scanned {
        assert_eq!(r, rid(key as u32));
    }
}

#[test]
fn test_descending_inserts_many_splits() {
    let dir = tempdir().unwrap();
    let mut tree = open_tree(&dir);

    // Enough keys to split repeatedly, inserted in reverse
    let n = 3 * LeafNode::MAX_ENTRIES as i32;
    for key in (1..=n).rev() {
        tree.insert(key, rid(key as u32)).unwrap();
    }
    assert!(tree.height() >= 2);

    let (cursor, _) = tree.locate(i32::MIN).unwrap();
    let keys: Vec<i32> = scan_from(&mut tree, cursor).iter().map(|&(k, _)| k).collect();
    assert_eq!(keys, (1..=n).collect::<Vec<i32>>());
}

// ============================================================================
// Sorted-invariant and round-trip checks
// ============================================================================

#[test]
fn test_interleaved_inserts_stay_sorted() {
    let dir = tempdir().unwrap();
    let mut tree = open_tree(&dir);

    // Deterministic shuffle: stride through the key space
    let n = 1000u32;
    let mut inserted = Vec::new();
    let mut k = 0u32;
    for _ in 0..n {
        k = (k + 389) % n; // 389 is coprime with 1000, touches every slot
        let key = k as i32 - 500; // negative keys too
        tree.insert(key, rid(k)).unwrap();
        inserted.push(key);
    }

    let (cursor, _) = tree.locate(i32::MIN).unwrap();
    let scanned = scan_from(&mut tree, cursor);
    assert_eq!(scanned.len(), n as usize);

    // Non-decreasing keys
    assert!(scanned.windows(2).all(|w| w[0].0 <= w[1].0));

    // Every inserted key resolves through locate + read_forward
    inserted.sort_unstable();
    let scanned_keys: Vec<i32> = scanned.iter().map(|&(k, _)| k).collect();
    assert_eq!(scanned_keys, inserted);
}

#[test]
fn test_round_trip_every_entry() {
    let dir = tempdir().unwrap();
    let mut tree = open_tree(&dir);

    let entries: Vec<(i32, RecordId)> = (0..500)
        .map(|i| ((i * 7) % 500 - 250, RecordId::new(i as u32, (i * 2) as u32)))
        .collect();
    for &(key, r) in &entries {
        tree.insert(key, r).unwrap();
    }

    for &(key, r) in &entries {
        let (cursor, exact) = tree.locate(key).unwrap();
        assert!(exact, "key {key} not found");

        // The exact (key, rid) pair appears among the entries with that key
        let mut c = cursor;
        let mut found = false;
        loop {
            let (k, got, next) = tree.read_forward(c).unwrap();
            if k != key {
                break;
            }
            if got == r {
                found = true;
                break;
            }
            c = next;
        }
        assert!(found, "rid for key {key} lost");
    }
}

// ============================================================================
// Height behavior
// ============================================================================

#[test]
fn test_height_monotonic_and_increments_by_one() {
    let dir = tempdir().unwrap();
    let mut tree = open_tree(&dir);

    let mut last_height = tree.height();
    assert_eq!(last_height, 0);

    for key in 0..(2 * LeafNode::MAX_ENTRIES as i32 + 10) {
        tree.insert(key, rid(key as u32)).unwrap();
        let h = tree.height();
        assert!(h == last_height || h == last_height + 1, "height jumped");
        assert!(h >= last_height, "height decreased");
        last_height = h;
    }
    assert!(last_height >= 2);
}

#[test]
fn test_empty_tree_insert_sets_height_one() {
    let dir = tempdir().unwrap();
    let mut tree = open_tree(&dir);

    assert!(matches!(tree.locate(1), Err(Error::NoSuchRecord)));
    tree.insert(1, rid(1)).unwrap();
    assert_eq!(tree.height(), 1);
}

// ============================================================================
// Cursor behavior
// ============================================================================

#[test]
fn test_cursor_exhaustion_is_distinguished() {
    let dir = tempdir().unwrap();
    let mut tree = open_tree(&dir);

    for key in [1, 2, 3] {
        tree.insert(key, rid(key as u32)).unwrap();
    }

    let (mut cursor, _) = tree.locate(1).unwrap();
    for _ in 0..3 {
        let (_, _, next) = tree.read_forward(cursor).unwrap();
        cursor = next;
    }

    assert!(cursor.is_exhausted());
    assert!(matches!(
        tree.read_forward(cursor),
        Err(Error::CursorExhausted)
    ));
}

#[test]
fn test_cursor_is_restartable() {
    let dir = tempdir().unwrap();
    let mut tree = open_tree(&dir);

    for key in 1..=1000 {
        tree.insert(key, rid(key as u32)).unwrap();
    }

    // Scan halfway, remember the position
    let (mut cursor, _) = tree.locate(1).unwrap();
    for _ in 0..500 {
        let (_, _, next) = tree.read_forward(cursor).unwrap();
        cursor = next;
    }
    let bookmark = cursor;

    // Do other reads in between
    tree.locate(999).unwrap();

    // Resuming from the bookmark continues exactly where we stopped
    let (key, _, _) = tree.read_forward(bookmark).unwrap();
    assert_eq!(key, 501);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_reopen_after_close() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.idx");

    {
        let mut tree = BTreeIndex::open(&path).unwrap();
        for key in 1..=1500 {
            tree.insert(key, rid(key as u32)).unwrap();
        }
        tree.close().unwrap();
    }

    let mut tree = BTreeIndex::open(&path).unwrap();
    let (cursor, exact) = tree.locate(1).unwrap();
    assert!(exact);
    let scanned = scan_from(&mut tree, cursor);
    assert_eq!(scanned.len(), 1500);
    assert!(scanned.windows(2).all(|w| w[0].0 < w[1].0));
}

#[test]
fn test_insert_after_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.idx");

    {
        let mut tree = BTreeIndex::open(&path).unwrap();
        for key in 1..=400 {
            tree.insert(key, rid(key as u32)).unwrap();
        }
        tree.close().unwrap();
    }

    {
        let mut tree = BTreeIndex::open(&path).unwrap();
        for key in 401..=800 {
            tree.insert(key, rid(key as u32)).unwrap();
        }
        tree.close().unwrap();
    }

    let mut tree = BTreeIndex::open(&path).unwrap();
    let (cursor, _) = tree.locate(1).unwrap();
    let keys: Vec<i32> = scan_from(&mut tree, cursor).iter().map(|&(k, _)| k).collect();
    assert_eq!(keys, (1..=800).collect::<Vec<i32>>());
}
