//! Index cursor - a stable scan position in the leaf chain.

use std::fmt;

use crate::common::PageId;

/// A position for forward iteration: (leaf page id, entry index).
///
/// Cursors are plain value snapshots, not live iterators: a scan can be
/// suspended and resumed from any cursor a previous `read_forward`
/// returned. A cursor whose page id is 0 (the metadata page, never a
/// leaf) marks an exhausted scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCursor {
    /// Leaf page the cursor points into.
    pub pid: PageId,
    /// Entry index within that leaf.
    pub eid: usize,
}

impl IndexCursor {
    /// Create a cursor at the given leaf and entry.
    #[inline]
    pub fn new(pid: PageId, eid: usize) -> Self {
        Self { pid, eid }
    }

    /// Whether this cursor has run off the end of the leaf chain.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pid == PageId::END_OF_CHAIN
    }
}

impl fmt::Display for IndexCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exhausted() {
            write!(f, "Cursor(exhausted)")
        } else {
            write!(f, "Cursor({}, {})", self.pid, self.eid)
        }
    }
}
