//! Configuration constants for BurrowDB.

/// Size of a page in bytes (4KB).
///
/// This value is chosen to match:
/// - OS page size on most systems (4096 bytes)
/// - Common database page sizes
///
/// # Memory Layout
/// With 4KB pages and 32-bit PageIds:
/// - Max pages: 2^32 = 4,294,967,296 pages
/// - Max index size: 4,294,967,296 × 4KB = 16TB
pub const PAGE_SIZE: usize = 4096;

/// Page id reserved for the tree metadata (root id + height).
pub const META_PAGE_ID: u32 = 0;

/// Conventional page id of the first leaf ever created.
///
/// The metadata page occupies id 0, so the first allocation after it
/// yields id 1. The empty-tree insert path relies on this.
pub const FIRST_LEAF_PAGE_ID: u32 = 1;

/// Maximum number of pages with u32 PageId.
pub const MAX_PAGES: u64 = (u32::MAX as u64) + 1;

/// Maximum theoretical index file size in bytes.
pub const MAX_FILE_SIZE_BYTES: u64 = MAX_PAGES * PAGE_SIZE as u64;
