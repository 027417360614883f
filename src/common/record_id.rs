//! Record identifier type.

use std::fmt;

use crate::common::PageId;

/// Locates a tuple in the table store: (page id, slot within that page).
///
/// The B+Tree stores RecordIds verbatim as leaf payloads and never
/// interprets them; only the table store gives them meaning.
///
/// # On-disk layout (8 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     page (u32, little-endian)
/// 4       4     slot (u32, little-endian)
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    /// Page of the table store holding the tuple.
    pub page: u32,
    /// Slot number within that page.
    pub slot: u32,
}

impl RecordId {
    /// Size of a serialized RecordId in bytes.
    pub const SIZE: usize = 8;

    /// Create a new RecordId.
    #[inline]
    pub fn new(page: u32, slot: u32) -> Self {
        Self { page, slot }
    }

    /// Deserialize from the first `SIZE` bytes of a slice.
    ///
    /// # Panics
    /// Panics if `data.len() < RecordId::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for RecordId");
        let page = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let slot = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        Self { page, slot }
    }

    /// Serialize into the first `SIZE` bytes of a slice.
    ///
    /// # Panics
    /// Panics if `data.len() < RecordId::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for RecordId");
        data[0..4].copy_from_slice(&self.page.to_le_bytes());
        data[4..8].copy_from_slice(&self.slot.to_le_bytes());
    }

    /// The table-store page as a typed id.
    #[inline]
    pub fn page_id(&self) -> PageId {
        PageId::new(self.page)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rid({}:{})", self.page, self.slot)
    }
}
