//! Internal node - child routing inside one page.
//!
//! # Page Layout
//! ```text
//! ┌────────┬───────────┬────────────────────────────────┬────────┐
//! │ Header │ child[0]  │ pairs: (key, child) × count    │ zeroes │
//! │  7 B   │   4 B     │ 8 B each, sorted by key        │        │
//! └────────┴───────────┴────────────────────────────────┴────────┘
//! ```
//!
//! `child[0]` routes keys below the first separator; pair *i* routes keys
//! in `[key[i], key[i+1])`. Equal keys route right, matching the leaf
//! split convention where the promoted key is the sibling's first key.

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageHeader, PageType};
use crate::storage::DiskManager;

/// A B+Tree internal node backed by its own page buffer.
pub struct InternalNode {
    page: Page,
}

impl InternalNode {
    /// Size of one serialized (key, child) pair.
    pub const PAIR_SIZE: usize = 4 + 4;

    /// Byte offset of the leading child pointer.
    const FIRST_CHILD_OFFSET: usize = PageHeader::SIZE;

    /// Byte offset of the first (key, child) pair.
    const PAIRS_OFFSET: usize = Self::FIRST_CHILD_OFFSET + 4;

    /// Maximum number of (key, child) pairs an internal node can hold.
    ///
    /// (4096 - 7 - 4) / 8 = 510, giving a fan-out of 511.
    pub const MAX_ENTRIES: usize = (PAGE_SIZE - PageHeader::SIZE - 4) / Self::PAIR_SIZE;

    /// Create a new empty internal node.
    pub fn new() -> Self {
        let mut page = Page::new();
        page.set_header(&PageHeader::new(PageType::Internal));
        Self { page }
    }

    /// Read an internal node from disk and verify its checksum.
    pub fn load(disk: &mut DiskManager, pid: PageId) -> Result<Self> {
        let page = disk.read_page(pid)?;
        if !page.verify_checksum() {
            return Err(Error::ChecksumMismatch(pid.0));
        }
        debug_assert_eq!(page.header().page_type, PageType::Internal);
        Ok(Self { page })
    }

    /// Write this node to disk, refreshing its checksum first.
    pub fn store(&mut self, disk: &mut DiskManager, pid: PageId) -> Result<()> {
        self.page.update_checksum();
        disk.write_page(pid, &self.page)
    }

    /// Number of (key, child) pairs in the node. O(1) - from the header.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.page.header().entry_count as usize
    }

    /// Find the child pointer to follow for `search_key`.
    ///
    /// Returns the pointer stored immediately before the first separator
    /// key strictly greater than `search_key`, together with that
    /// separator's index; the last pointer if no separator exceeds the
    /// key. Equal keys route to the right subtree.
    pub fn locate_child(&self, search_key: i32) -> (PageId, usize) {
        // Upper bound: first separator with key > search_key.
        let count = self.entry_count();
        let mut lo = 0;
        let mut hi = count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.key_at(mid) <= search_key {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        (self.child_at(lo), lo)
    }

    /// Insert a (key, child) pair at its routing position.
    ///
    /// # Errors
    /// Returns [`Error::NodeFull`] if the node is at capacity.
    pub fn insert(&mut self, key: i32, child: PageId) -> Result<()> {
        let count = self.entry_count();
        if count == Self::MAX_ENTRIES {
            return Err(Error::NodeFull);
        }

        let (_, index) = self.locate_child(key);

        let start = Self::pair_offset(index);
        let end = Self::pair_offset(count);
        self.page
            .as_mut_slice()
            .copy_within(start..end, start + Self::PAIR_SIZE);

        self.write_pair(index, key, child);
        self.set_entry_count(count + 1);
        Ok(())
    }

    /// Insert a (key, child) pair into a full node by splitting with
    /// `sibling`, which must be empty.
    ///
    /// Conceptually the pair is inserted into an oversized sequence which
    /// is then cut at index `(count + 1) / 2`. The key at the cut is
    /// *promoted* - returned to the caller and kept in neither half - and
    /// its child pointer becomes the sibling's leading pointer. Unlike a
    /// leaf split, the middle key is not duplicated into a child.
    pub fn insert_and_split(
        &mut self,
        key: i32,
        child: PageId,
        sibling: &mut InternalNode,
    ) -> Result<i32> {
        debug_assert_eq!(sibling.entry_count(), 0, "sibling must start empty");

        let count = self.entry_count();
        let (_, index) = self.locate_child(key);

        // Decode into an oversized in-memory sequence, insert, then cut.
        let mut keys: Vec<i32> = (0..count).map(|i| self.key_at(i)).collect();
        let mut children: Vec<PageId> = (0..=count).map(|i| self.child_at(i)).collect();
        keys.insert(index, key);
        children.insert(index + 1, child);

        let split = (count + 1) / 2;
        let mid_key = keys[split];

        self.rebuild(&children[..=split], &keys[..split]);
        sibling.rebuild(&children[split + 1..], &keys[split + 1..]);

        Ok(mid_key)
    }

    /// Reinitialize this node as a fresh root over two children.
    ///
    /// Used only when a split propagates past the former root: `left` is
    /// the old root, `right` its new sibling, `key` the promoted
    /// separator.
    pub fn init_root(&mut self, left: PageId, key: i32, right: PageId) -> Result<()> {
        self.page.reset();
        self.page.set_header(&PageHeader::new(PageType::Internal));
        self.set_first_child(left);
        self.insert(key, right)
    }

    // ========================================================================
    // In-page pair access
    // ========================================================================

    #[inline]
    fn pair_offset(index: usize) -> usize {
        Self::PAIRS_OFFSET + index * Self::PAIR_SIZE
    }

    fn key_at(&self, index: usize) -> i32 {
        let o = Self::pair_offset(index);
        let data = self.page.as_slice();
        i32::from_le_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]])
    }

    /// Child pointer `index`, for `index` in `0..=entry_count()`.
    ///
    /// Pointer 0 is the leading child; pointer `i > 0` is the child of
    /// pair `i - 1`.
    fn child_at(&self, index: usize) -> PageId {
        let o = if index == 0 {
            Self::FIRST_CHILD_OFFSET
        } else {
            Self::pair_offset(index - 1) + 4
        };
        let data = self.page.as_slice();
        PageId::new(u32::from_le_bytes([
            data[o],
            data[o + 1],
            data[o + 2],
            data[o + 3],
        ]))
    }

    fn set_first_child(&mut self, pid: PageId) {
        let o = Self::FIRST_CHILD_OFFSET;
        self.page.as_mut_slice()[o..o + 4].copy_from_slice(&pid.0.to_le_bytes());
    }

    fn write_pair(&mut self, index: usize, key: i32, child: PageId) {
        let o = Self::pair_offset(index);
        let data = self.page.as_mut_slice();
        data[o..o + 4].copy_from_slice(&key.to_le_bytes());
        data[o + 4..o + 8].copy_from_slice(&child.0.to_le_bytes());
    }

    fn set_entry_count(&mut self, count: usize) {
        debug_assert!(count <= Self::MAX_ENTRIES);
        let mut header = self.page.header();
        header.entry_count = count as u16;
        self.page.set_header(&header);
    }

    /// Rewrite the whole routing region from decoded form.
    ///
    /// `children` must hold exactly one more element than `keys`.
    fn rebuild(&mut self, children: &[PageId], keys: &[i32]) {
        debug_assert_eq!(children.len(), keys.len() + 1);

        // Clear everything after the header before laying pairs back down.
        self.page.as_mut_slice()[PageHeader::SIZE..].fill(0);
        self.set_first_child(children[0]);
        for (i, (&key, &child)) in keys.iter().zip(children[1..].iter()).enumerate() {
            self.write_pair(i, key, child);
        }
        self.set_entry_count(keys.len());
    }
}

impl Default for InternalNode {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a node routing: p0 | 10:p1 | 20:p2 | 30:p3
    fn sample_node() -> InternalNode {
        let mut node = InternalNode::new();
        node.init_root(PageId::new(100), 10, PageId::new(101)).unwrap();
        node.insert(20, PageId::new(102)).unwrap();
        node.insert(30, PageId::new(103)).unwrap();
        node
    }

    #[test]
    fn test_capacity() {
        // (4096 - 7 - 4) / 8
        assert_eq!(InternalNode::MAX_ENTRIES, 510);
    }

    #[test]
    fn test_init_root() {
        let mut node = InternalNode::new();
        node.init_root(PageId::new(1), 50, PageId::new(2)).unwrap();

        assert_eq!(node.entry_count(), 1);
        assert_eq!(node.locate_child(49), (PageId::new(1), 0));
        assert_eq!(node.locate_child(50), (PageId::new(2), 1));
        assert_eq!(node.locate_child(51), (PageId::new(2), 1));
    }

    #[test]
    fn test_locate_child_routing() {
        let node = sample_node();

        // Below the first separator: leading pointer
        assert_eq!(node.locate_child(i32::MIN), (PageId::new(100), 0));
        assert_eq!(node.locate_child(9), (PageId::new(100), 0));
        // Between separators
        assert_eq!(node.locate_child(15), (PageId::new(101), 1));
        assert_eq!(node.locate_child(25), (PageId::new(102), 2));
        // Past the last separator: last pointer
        assert_eq!(node.locate_child(35), (PageId::new(103), 3));
        assert_eq!(node.locate_child(i32::MAX), (PageId::new(103), 3));
    }

    #[test]
    fn test_locate_child_equal_routes_right() {
        let node = sample_node();

        // A key equal to a separator belongs to the right subtree
        assert_eq!(node.locate_child(10), (PageId::new(101), 1));
        assert_eq!(node.locate_child(20), (PageId::new(102), 2));
        assert_eq!(node.locate_child(30), (PageId::new(103), 3));
    }

    #[test]
    fn test_insert_shifts_pairs() {
        let mut node = sample_node();
        node.insert(15, PageId::new(110)).unwrap();

        assert_eq!(node.entry_count(), 4);
        assert_eq!(node.locate_child(12), (PageId::new(101), 1));
        assert_eq!(node.locate_child(17), (PageId::new(110), 2));
        assert_eq!(node.locate_child(25), (PageId::new(102), 3));
        assert_eq!(node.locate_child(35), (PageId::new(103), 4));
    }

    #[test]
    fn test_insert_full_node_fails() {
        let mut node = InternalNode::new();
        node.init_root(PageId::new(0), 1, PageId::new(1)).unwrap();
        for i in 1..InternalNode::MAX_ENTRIES {
            node.insert((i + 1) as i32, PageId::new(i as u32 + 1)).unwrap();
        }
        assert_eq!(node.entry_count(), InternalNode::MAX_ENTRIES);

        match node.insert(99999, PageId::new(9999)) {
            Err(Error::NodeFull) => {}
            other => panic!("expected NodeFull, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_and_split_promotes_middle_key() {
        // Separators 2, 4, 6, ..., 2*MAX; children 0..=MAX
        let mut node = InternalNode::new();
        node.init_root(PageId::new(0), 2, PageId::new(1)).unwrap();
        for i in 2..=InternalNode::MAX_ENTRIES {
            node.insert((i * 2) as i32, PageId::new(i as u32)).unwrap();
        }

        let count = node.entry_count();
        let mut sibling = InternalNode::new();
        let mid_key = node
            .insert_and_split(7, PageId::new(7777), &mut sibling)
            .unwrap();

        // Promoted key kept in neither half; totals add up
        assert_eq!(node.entry_count() + sibling.entry_count(), count);

        let split = (count + 1) / 2;
        assert_eq!(node.entry_count(), split);
        assert_eq!(sibling.entry_count(), count - split);

        // Keys left of the cut are all < mid_key, right are all > mid_key
        let (_, last_left) = node.locate_child(mid_key - 1);
        assert_eq!(last_left, node.entry_count());
        assert_eq!(sibling.locate_child(mid_key).1, 0);

        // The new pair is findable in the left half (7 < mid_key)
        assert_eq!(node.locate_child(7).0, PageId::new(7777));
    }

    #[test]
    fn test_insert_and_split_sibling_leading_pointer() {
        // Small-scale shape check with a hand-built oversized sequence:
        // p0 | 10:p1 | 20:p2 | 30:p3, insert 40:p4.
        // After the conceptual insert: keys [10,20,30,40], children
        // [p0,p1,p2,p3,p4]; split = (3+1)/2 = 2, mid = 30.
        let mut node = sample_node();
        node.set_entry_count(3); // already 3; explicit for readability

        let mut sibling = InternalNode::new();
        let mid_key = node
            .insert_and_split(40, PageId::new(104), &mut sibling)
            .unwrap();

        assert_eq!(mid_key, 30);
        // Left: p100 | 10:p101 | 20:p102
        assert_eq!(node.entry_count(), 2);
        assert_eq!(node.locate_child(5), (PageId::new(100), 0));
        assert_eq!(node.locate_child(15), (PageId::new(101), 1));
        assert_eq!(node.locate_child(25), (PageId::new(102), 2));
        // Right: p103 | 40:p104 - the cut pair's child leads the sibling
        assert_eq!(sibling.entry_count(), 1);
        assert_eq!(sibling.locate_child(35), (PageId::new(103), 0));
        assert_eq!(sibling.locate_child(40), (PageId::new(104), 1));
    }

    #[test]
    fn test_store_load_roundtrip() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let path = dir.path().join("internal.idx");
        let mut disk = DiskManager::create(&path).unwrap();
        let pid = disk.allocate_page().unwrap();

        let mut node = sample_node();
        node.store(&mut disk, pid).unwrap();

        let loaded = InternalNode::load(&mut disk, pid).unwrap();
        assert_eq!(loaded.entry_count(), 3);
        assert_eq!(loaded.locate_child(15), (PageId::new(101), 1));
        assert_eq!(loaded.locate_child(35), (PageId::new(103), 3));
    }
}
