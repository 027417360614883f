//! Page identifier type.

use std::fmt;

/// Identifies a page on disk.
///
/// Using `u32` allows for 4 billion pages:
/// - 4,294,967,296 pages × 4KB = 16TB maximum index size
///
/// Page 0 is reserved for the tree metadata, so 0 doubles as the
/// "no next leaf" marker inside leaf pages; a real leaf never has id 0.
///
/// # Example
/// ```
/// use burrowdb::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Invalid/sentinel page id.
    ///
    /// Used to represent "no page" or uninitialized state, e.g. the root
    /// id of an empty tree.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// End-of-chain marker stored in a leaf's next-leaf field.
    pub const END_OF_CHAIN: PageId = PageId(0);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page id is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
