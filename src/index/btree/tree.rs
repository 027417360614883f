//! Tree manager - root/height bookkeeping and cross-node orchestration.
//!
//! [`BTreeIndex`] owns the disk manager and the two pieces of tree-level
//! state (root page id, height). It decodes pages into [`LeafNode`] /
//! [`InternalNode`] views, mutates them through the node codecs, and
//! writes them back.
//!
//! # State machine over height
//! - height 0: empty tree - no node pages, `locate` always misses.
//! - height 1: the root is a single leaf.
//! - height ≥ 2: the root is internal; leaves sit `height` levels down.
//!
//! Height only ever grows (there is no delete), by exactly one per root
//! split.

use std::path::Path;

use crate::common::config::{FIRST_LEAF_PAGE_ID, META_PAGE_ID};
use crate::common::{Error, PageId, RecordId, Result};
use crate::index::btree::cursor::IndexCursor;
use crate::index::btree::internal::InternalNode;
use crate::index::btree::leaf::LeafNode;
use crate::storage::page::{Page, PageHeader, PageType};
use crate::storage::DiskManager;

/// Outcome of one level of the recursive insert descent.
///
/// Making the three-way outcome a tagged type (instead of a sentinel
/// status code) forces every call site to handle the split case
/// explicitly.
enum InsertOutcome {
    /// The subtree absorbed the entry; nothing propagates.
    Inserted,
    /// The child split: `key` must be routed to `pid` from here on.
    Split { key: i32, pid: PageId },
}

/// A disk-resident B+Tree index over i32 keys with RecordId payloads.
///
/// # Persistence
/// Tree metadata (root id, height) lives in page 0 and is written by
/// [`close`](BTreeIndex::close). A tree that is dropped without `close`
/// keeps its node pages but loses metadata updates since the last close,
/// and will reopen in whatever state page 0 last recorded. Multi-page
/// split sequences are not atomic either; see the crate docs.
///
/// # Concurrency
/// Single-writer, single-threaded. Callers must serialize all access to
/// one open tree.
///
/// # Example
/// ```no_run
/// use burrowdb::{BTreeIndex, RecordId};
///
/// let mut index = BTreeIndex::open("orders.idx").unwrap();
/// index.insert(42, RecordId::new(7, 3)).unwrap();
///
/// let (cursor, exact) = index.locate(42).unwrap();
/// assert!(exact);
/// let (key, rid, _next) = index.read_forward(cursor).unwrap();
/// assert_eq!((key, rid), (42, RecordId::new(7, 3)));
/// index.close().unwrap();
/// ```
pub struct BTreeIndex {
    disk: DiskManager,
    /// Root page id; `PageId::INVALID` while the tree is empty.
    root_pid: PageId,
    /// Number of node levels, root to leaf inclusive. 0 = empty.
    height: u32,
}

impl BTreeIndex {
    /// Byte offsets of the metadata fields within page 0.
    const META_OFFSET_ROOT: usize = PageHeader::SIZE;
    const META_OFFSET_HEIGHT: usize = PageHeader::SIZE + 4;

    /// Open an index file, creating it if it doesn't exist.
    ///
    /// A fresh file gets a zeroed metadata page and starts empty.
    /// Corrupt or invalid persisted metadata (bad checksum, wrong page
    /// type, root id pointing at the metadata page) degrades to the
    /// empty state instead of failing open.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut disk = DiskManager::open_or_create(path)?;

        if disk.page_count() == 0 {
            // Fresh store: reserve page 0 for metadata.
            disk.allocate_page()?;
            return Ok(Self {
                disk,
                root_pid: PageId::INVALID,
                height: 0,
            });
        }

        let page = disk.read_page(PageId::new(META_PAGE_ID))?;
        let (root_pid, height) = Self::parse_metadata(&page);
        Ok(Self {
            disk,
            root_pid,
            height,
        })
    }

    /// Persist (root id, height) to the metadata page and close.
    pub fn close(mut self) -> Result<()> {
        let mut page = Page::new();
        page.set_header(&PageHeader::new(PageType::Meta));

        if self.root_pid.is_valid() {
            let data = page.as_mut_slice();
            data[Self::META_OFFSET_ROOT..Self::META_OFFSET_ROOT + 4]
                .copy_from_slice(&self.root_pid.0.to_le_bytes());
            data[Self::META_OFFSET_HEIGHT..Self::META_OFFSET_HEIGHT + 4]
                .copy_from_slice(&self.height.to_le_bytes());
        }

        page.update_checksum();
        self.disk.write_page(PageId::new(META_PAGE_ID), &page)
    }

    /// Decode (root id, height) from page 0, degrading to Empty on
    /// anything suspicious.
    fn parse_metadata(page: &Page) -> (PageId, u32) {
        let empty = (PageId::INVALID, 0);

        if !page.verify_checksum() || page.header().page_type != PageType::Meta {
            return empty;
        }

        let data = page.as_slice();
        let o = Self::META_OFFSET_ROOT;
        let root = u32::from_le_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]]);
        let o = Self::META_OFFSET_HEIGHT;
        let height = u32::from_le_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]]);

        // Root must be a real node page (>= 1) and the height nonzero.
        if root < FIRST_LEAF_PAGE_ID || root == PageId::INVALID.0 || height == 0 {
            return empty;
        }
        (PageId::new(root), height)
    }

    /// Number of node levels in the tree; 0 when empty.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Page id of the root node; invalid when the tree is empty.
    #[inline]
    pub fn root_pid(&self) -> PageId {
        self.root_pid
    }

    /// Whether the tree holds no entries at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert a (key, rid) pair into the index.
    ///
    /// Splits propagate bottom-up only as far as necessary; a split
    /// reaching the root adds a new root and grows the height by exactly
    /// one, so all leaves stay at the same depth.
    pub fn insert(&mut self, key: i32, rid: RecordId) -> Result<()> {
        if self.height == 0 {
            // First entry ever: the tree becomes a single root leaf.
            let mut leaf = LeafNode::new();
            leaf.insert(key, rid)?;

            let pid = self.disk.allocate_page()?;
            leaf.store(&mut self.disk, pid)?;

            self.root_pid = pid;
            self.height = 1;
            return Ok(());
        }

        // A Split outcome cannot reach this level: the recursion grows a
        // new root itself when the old root overflows.
        match self.insert_recursive(key, rid, 1, self.root_pid)? {
            InsertOutcome::Inserted => Ok(()),
            InsertOutcome::Split { .. } => unreachable!("root split is handled in the descent"),
        }
    }

    /// One level of the insert descent. `level` counts from 1 at the
    /// root; `level == self.height` is the leaf level.
    fn insert_recursive(
        &mut self,
        key: i32,
        rid: RecordId,
        level: u32,
        pid: PageId,
    ) -> Result<InsertOutcome> {
        if level == self.height {
            return self.insert_into_leaf(key, rid, level, pid);
        }

        let mut node = InternalNode::load(&mut self.disk, pid)?;
        let (child, _) = node.locate_child(key);

        match self.insert_recursive(key, rid, level + 1, child)? {
            InsertOutcome::Inserted => Ok(InsertOutcome::Inserted),
            InsertOutcome::Split {
                key: promoted,
                pid: new_child,
            } => match node.insert(promoted, new_child) {
                Ok(()) => {
                    // Absorbed here; the cascade stops.
                    node.store(&mut self.disk, pid)?;
                    Ok(InsertOutcome::Inserted)
                }
                Err(Error::NodeFull) => {
                    let mut sibling = InternalNode::new();
                    let mid_key = node.insert_and_split(promoted, new_child, &mut sibling)?;
                    let sibling_pid = self.disk.allocate_page()?;

                    node.store(&mut self.disk, pid)?;
                    sibling.store(&mut self.disk, sibling_pid)?;

                    if level == 1 {
                        self.grow_root(pid, mid_key, sibling_pid)?;
                        Ok(InsertOutcome::Inserted)
                    } else {
                        Ok(InsertOutcome::Split {
                            key: mid_key,
                            pid: sibling_pid,
                        })
                    }
                }
                Err(e) => Err(e),
            },
        }
    }

    /// Leaf level of the insert descent.
    fn insert_into_leaf(
        &mut self,
        key: i32,
        rid: RecordId,
        level: u32,
        pid: PageId,
    ) -> Result<InsertOutcome> {
        let mut leaf = LeafNode::load(&mut self.disk, pid)?;

        match leaf.insert(key, rid) {
            Ok(()) => {
                leaf.store(&mut self.disk, pid)?;
                Ok(InsertOutcome::Inserted)
            }
            Err(Error::NodeFull) => {
                let mut sibling = LeafNode::new();
                let sibling_pid = self.disk.allocate_page()?;
                let split_key = leaf.insert_and_split(key, rid, &mut sibling, sibling_pid)?;

                leaf.store(&mut self.disk, pid)?;
                sibling.store(&mut self.disk, sibling_pid)?;

                if level == 1 {
                    // The root itself was a leaf; synthesize an internal
                    // root above the two halves.
                    self.grow_root(pid, split_key, sibling_pid)?;
                    Ok(InsertOutcome::Inserted)
                } else {
                    Ok(InsertOutcome::Split {
                        key: split_key,
                        pid: sibling_pid,
                    })
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Put a fresh internal root above `left` and `right`, raising the
    /// tree height by one. Terminal step of a root split.
    fn grow_root(&mut self, left: PageId, key: i32, right: PageId) -> Result<()> {
        let mut root = InternalNode::new();
        root.init_root(left, key, right)?;

        let root_pid = self.disk.allocate_page()?;
        root.store(&mut self.disk, root_pid)?;

        self.root_pid = root_pid;
        self.height += 1;
        Ok(())
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Find the leaf position for `search_key`.
    ///
    /// Returns a cursor pointing at the matching entry, or at the first
    /// entry greater than `search_key` when there is no match; the `bool`
    /// reports which case occurred. Either way the cursor is a valid
    /// range-scan start position (it may sit one past the end of the last
    /// relevant leaf if every key in it is smaller).
    ///
    /// # Errors
    /// Returns [`Error::NoSuchRecord`] on an empty tree.
    pub fn locate(&mut self, search_key: i32) -> Result<(IndexCursor, bool)> {
        if self.height == 0 {
            return Err(Error::NoSuchRecord);
        }

        // Descend the internal levels; the loop body runs height-1 times.
        let mut pid = self.root_pid;
        for _ in 1..self.height {
            let node = InternalNode::load(&mut self.disk, pid)?;
            let (child, _) = node.locate_child(search_key);
            pid = child;
        }

        let leaf = LeafNode::load(&mut self.disk, pid)?;
        match leaf.locate(search_key) {
            Ok(eid) => Ok((IndexCursor::new(pid, eid), true)),
            Err(eid) => Ok((IndexCursor::new(pid, eid), false)),
        }
    }

    /// Read the entry under `cursor` and compute the following position.
    ///
    /// Advancing past a leaf's last entry hops to `(next_leaf, 0)`; once
    /// the chain runs out the returned cursor is exhausted and the next
    /// call reports [`Error::CursorExhausted`]. Cursors are stable, so a
    /// scan can resume from any previously returned position.
    pub fn read_forward(&mut self, cursor: IndexCursor) -> Result<(i32, RecordId, IndexCursor)> {
        if cursor.is_exhausted() {
            return Err(Error::CursorExhausted);
        }

        let leaf = LeafNode::load(&mut self.disk, cursor.pid)?;
        let (key, rid) = leaf.read_entry(cursor.eid)?;

        let next = if cursor.eid + 1 == leaf.entry_count() {
            IndexCursor::new(leaf.next_leaf(), 0)
        } else {
            IndexCursor::new(cursor.pid, cursor.eid + 1)
        };

        Ok((key, rid, next))
    }
}

// ============================================================================
// TESTS
// ============================================================================
