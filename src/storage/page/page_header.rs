//! Page header and type definitions.
//!
//! Every page starts with a [`PageHeader`] containing metadata:
//! - [`PageType`] discriminator
//! - CRC32 checksum for integrity
//! - Explicit entry count
//!
//! Storing the entry count in the header (rather than scanning entries
//! until a zero key) makes `entry_count()` O(1) and lets key 0 be a
//! legal index key.

/// Type of page stored on disk.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Uninitialized or corrupted page.
    #[default]
    Invalid = 0,
    /// Tree metadata page (root id + height), always page 0.
    Meta = 1,
    /// B+Tree leaf node.
    Leaf = 2,
    /// B+Tree internal (non-leaf) node.
    Internal = 3,
}

impl PageType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PageType::Meta,
            2 => PageType::Leaf,
            3 => PageType::Internal,
            _ => PageType::Invalid,
        }
    }
}

/// Metadata stored at the beginning of every page.
///
/// # Layout (7 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     page_type (PageType as u8)
/// 1       4     checksum (CRC32, little-endian)
/// 5       2     entry_count (u16, little-endian)
/// ```
///
/// # Checksum
/// The checksum is computed over the entire page with the checksum field
/// itself set to zero. This allows verification without special handling.
///
/// # Entry count
/// Number of valid entries in a node page: (key, RecordId) pairs in a
/// leaf, (key, child) pairs in an internal node. Zero for the meta page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Type of this page.
    pub page_type: PageType,
    /// CRC32 checksum of the page contents.
    pub checksum: u32,
    /// Number of valid entries stored in the page body.
    pub entry_count: u16,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 7;

    /// Offset of each field within the header.
    pub const OFFSET_PAGE_TYPE: usize = 0;
    pub const OFFSET_CHECKSUM: usize = 1;
    pub const OFFSET_ENTRY_COUNT: usize = 5;

    /// Create a new header with the given page type.
    ///
    /// Checksum and entry count are initialized to zero.
    pub fn new(page_type: PageType) -> Self {
        Self {
            page_type,
            checksum: 0,
            entry_count: 0,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        let page_type = PageType::from_u8(data[Self::OFFSET_PAGE_TYPE]);

        let checksum = u32::from_le_bytes([
            data[Self::OFFSET_CHECKSUM],
            data[Self::OFFSET_CHECKSUM + 1],
            data[Self::OFFSET_CHECKSUM + 2],
            data[Self::OFFSET_CHECKSUM + 3],
        ]);

        let entry_count = u16::from_le_bytes([
            data[Self::OFFSET_ENTRY_COUNT],
            data[Self::OFFSET_ENTRY_COUNT + 1],
        ]);

        Self {
            page_type,
            checksum,
            entry_count,
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_PAGE_TYPE] = self.page_type as u8;

        let checksum_bytes = self.checksum.to_le_bytes();
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4].copy_from_slice(&checksum_bytes);

        let count_bytes = self.entry_count.to_le_bytes();
        data[Self::OFFSET_ENTRY_COUNT..Self::OFFSET_ENTRY_COUNT + 2].copy_from_slice(&count_bytes);
    }

    /// Compute CRC32 checksum of a page.
    ///
    /// The checksum is computed with the checksum field (bytes 1-4) zeroed
    /// out, so the checksum doesn't include itself.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();

        // Hash bytes before checksum field (just byte 0: page_type)
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);

        // Skip checksum field by feeding zeros instead
        hasher.update(&[0u8; 4]);

        // Hash bytes after checksum field (rest of the page)
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 4..]);

        hasher.finalize()
    }

    /// Verify that the stored checksum matches the computed checksum.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}

// ============================================================================
// TESTS
// ============================================================================
