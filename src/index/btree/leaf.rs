//! Leaf node - sorted (key, RecordId) entries inside one page.
//!
//! # Page Layout
//! ```text
//! ┌────────┬──────────────────────────────┬───────────┬───────────┐
//! │ Header │ entries: (key, rid) × count  │  zeroes   │ next_leaf │
//! │  7 B   │ 12 B each, sorted by key     │           │   4 B     │
//! └────────┴──────────────────────────────┴───────────┴───────────┘
//! 0        7                                           PAGE_SIZE-4
//! ```
//!
//! The next-leaf pointer in the page tail chains leaves left-to-right so
//! range scans can walk the bottom of the tree without touching internal
//! nodes. A stored 0 means "last leaf" (page 0 is the metadata page, so
//! no leaf ever has id 0).
//!
//! The entry count lives in the page header, so 0 is a legal key and
//! `entry_count()` is O(1).

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, RecordId, Result};
use crate::storage::page::{Page, PageHeader, PageType};
use crate::storage::DiskManager;

/// A B+Tree leaf node backed by its own page buffer.
///
/// Each node owns a [`Page`] as a value; nothing is shared between nodes,
/// so leaves can be constructed and unit-tested in isolation.
pub struct LeafNode {
    page: Page,
}

impl LeafNode {
    /// Size of one serialized entry: i32 key + RecordId.
    pub const ENTRY_SIZE: usize = 4 + RecordId::SIZE;

    /// Byte offset of the next-leaf pointer (last 4 bytes of the page).
    const NEXT_LEAF_OFFSET: usize = PAGE_SIZE - 4;

    /// Maximum number of entries a leaf can hold.
    ///
    /// Everything between the header and the next-leaf pointer is entry
    /// space: (4096 - 7 - 4) / 12 = 340.
    pub const MAX_ENTRIES: usize =
        (PAGE_SIZE - PageHeader::SIZE - 4) / Self::ENTRY_SIZE;

    /// Create a new empty leaf.
    pub fn new() -> Self {
        let mut page = Page::new();
        page.set_header(&PageHeader::new(PageType::Leaf));
        Self { page }
    }

    /// Read a leaf from disk and verify its checksum.
    pub fn load(disk: &mut DiskManager, pid: PageId) -> Result<Self> {
        let page = disk.read_page(pid)?;
        if !page.verify_checksum() {
            return Err(Error::ChecksumMismatch(pid.0));
        }
        debug_assert_eq!(page.header().page_type, PageType::Leaf);
        Ok(Self { page })
    }

    /// Write this leaf to disk, refreshing its checksum first.
    pub fn store(&mut self, disk: &mut DiskManager, pid: PageId) -> Result<()> {
        self.page.update_checksum();
        disk.write_page(pid, &self.page)
    }

    /// Number of valid entries in the node. O(1) - read from the header.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.page.header().entry_count as usize
    }

    /// Lower-bound search within the node.
    ///
    /// Follows the `slice::binary_search` convention: `Ok(i)` if `i` is the
    /// first entry holding `search_key`, `Err(i)` with the insertion point
    /// otherwise. Either way the caller gets a usable index.
    pub fn locate(&self, search_key: i32) -> std::result::Result<usize, usize> {
        let count = self.entry_count();
        let mut lo = 0;
        let mut hi = count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.key_at(mid) < search_key {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo < count && self.key_at(lo) == search_key {
            Ok(lo)
        } else {
            Err(lo)
        }
    }

    /// Insert a (key, rid) entry, keeping entries sorted.
    ///
    /// Entries at and after the insertion point shift right by one slot,
    /// so inserts are O(n) in the entry count. Duplicate keys are allowed;
    /// a new duplicate lands at the lower bound, before its equals.
    ///
    /// # Errors
    /// Returns [`Error::NodeFull`] if the leaf is at capacity.
    pub fn insert(&mut self, key: i32, rid: RecordId) -> Result<()> {
        let count = self.entry_count();
        if count == Self::MAX_ENTRIES {
            return Err(Error::NodeFull);
        }

        let index = match self.locate(key) {
            Ok(i) | Err(i) => i,
        };

        let start = Self::entry_offset(index);
        let end = Self::entry_offset(count);
        self.page
            .as_mut_slice()
            .copy_within(start..end, start + Self::ENTRY_SIZE);

        self.write_entry(index, key, rid);
        self.set_entry_count(count + 1);
        Ok(())
    }

    /// Insert a (key, rid) entry into a full leaf by splitting with
    /// `sibling`, which must be empty.
    ///
    /// The split point is `(count + 1) / 2` over the pre-insert node:
    /// entries at and after it move to the sibling, and the incoming
    /// entry goes wherever its sort position falls. Afterwards the
    /// sibling inherits this leaf's old next-leaf pointer and this leaf
    /// points at `sibling_pid` (allocated by the tree manager before the
    /// call), so the horizontal chain stays intact.
    ///
    /// Returns the sibling's first (lowest) key, which the caller must
    /// promote into the parent.
    pub fn insert_and_split(
        &mut self,
        key: i32,
        rid: RecordId,
        sibling: &mut LeafNode,
        sibling_pid: PageId,
    ) -> Result<i32> {
        debug_assert_eq!(sibling.entry_count(), 0, "sibling must start empty");

        let count = self.entry_count();
        let index = match self.locate(key) {
            Ok(i) | Err(i) => i,
        };
        let split = (count + 1) / 2;

        // Move entries [split..count) into the sibling.
        let moved = count - split;
        let src = Self::entry_offset(split)..Self::entry_offset(count);
        let dst = Self::entry_offset(0);
        sibling.page.as_mut_slice()[dst..dst + moved * Self::ENTRY_SIZE]
            .copy_from_slice(&self.page.as_slice()[src.clone()]);
        self.page.as_mut_slice()[src].fill(0);
        sibling.set_entry_count(moved);
        self.set_entry_count(split);

        // The incoming entry lands in whichever half owns its position.
        if index < split {
            self.insert(key, rid)?;
        } else {
            sibling.insert(key, rid)?;
        }

        // Relink the leaf chain: self -> sibling -> old successor.
        let old_next = self.next_leaf();
        sibling.set_next_leaf(old_next)?;
        self.set_next_leaf(sibling_pid)?;

        Ok(sibling.key_at(0))
    }

    /// Read the (key, rid) entry at `index`.
    ///
    /// # Errors
    /// Returns [`Error::NoSuchRecord`] if `index` is out of
    /// `[0, entry_count)`.
    pub fn read_entry(&self, index: usize) -> Result<(i32, RecordId)> {
        if index >= self.entry_count() {
            return Err(Error::NoSuchRecord);
        }
        Ok((self.key_at(index), self.rid_at(index)))
    }

    /// Page id of the next leaf in the chain; `PageId::END_OF_CHAIN` (0)
    /// if this is the last leaf.
    pub fn next_leaf(&self) -> PageId {
        let data = self.page.as_slice();
        let o = Self::NEXT_LEAF_OFFSET;
        PageId::new(u32::from_le_bytes([
            data[o],
            data[o + 1],
            data[o + 2],
            data[o + 3],
        ]))
    }

    /// Set the next-leaf pointer.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPageId`] for the invalid sentinel id.
    pub fn set_next_leaf(&mut self, pid: PageId) -> Result<()> {
        if !pid.is_valid() {
            return Err(Error::InvalidPageId(pid.0));
        }
        let o = Self::NEXT_LEAF_OFFSET;
        self.page.as_mut_slice()[o..o + 4].copy_from_slice(&pid.0.to_le_bytes());
        Ok(())
    }

    // ========================================================================
    // In-page entry access
    // ========================================================================

    #[inline]
    fn entry_offset(index: usize) -> usize {
        PageHeader::SIZE + index * Self::ENTRY_SIZE
    }

    fn key_at(&self, index: usize) -> i32 {
        let o = Self::entry_offset(index);
        let data = self.page.as_slice();
        i32::from_le_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]])
    }

    fn rid_at(&self, index: usize) -> RecordId {
        let o = Self::entry_offset(index) + 4;
        RecordId::from_bytes(&self.page.as_slice()[o..o + RecordId::SIZE])
    }

    fn write_entry(&mut self, index: usize, key: i32, rid: RecordId) {
        let o = Self::entry_offset(index);
        let data = self.page.as_mut_slice();
        data[o..o + 4].copy_from_slice(&key.to_le_bytes());
        rid.write_to(&mut data[o + 4..o + 4 + RecordId::SIZE]);
    }

    fn set_entry_count(&mut self, count: usize) {
        debug_assert!(count <= Self::MAX_ENTRIES);
        let mut header = self.page.header();
        header.entry_count = count as u16;
        self.page.set_header(&header);
    }
}

impl Default for LeafNode {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
