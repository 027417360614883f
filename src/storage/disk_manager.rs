//! Disk Manager - low-level file I/O for index pages.
//!
//! The [`DiskManager`] is the Page I/O collaborator beneath the B+Tree:
//! - Reading and writing whole pages by id
//! - Allocating new page ids (monotonic, append-only growth)
//! - Managing the index file

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::PAGE_SIZE;
use crate::common::{PageId, Result};
use crate::storage::page::Page;

/// Manages disk I/O for a single index file.
///
/// # File Layout
/// The index is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Page N is located at file offset `N × PAGE_SIZE`. Page 0 is reserved
/// for the tree metadata; leaves and internal nodes occupy ids ≥ 1.
///
/// # Allocation
/// `allocate_page()` hands out `page_count` (one past the highest written
/// page) and extends the file with a zeroed page. Ids are never reused;
/// there is no free list because the tree never deletes nodes.
///
/// # Thread Safety
/// `DiskManager` is **single-threaded**. Callers must serialize access.
///
/// # Durability
/// All writes are followed by `fsync()`. Multi-page sequences (a split
/// writes the node, its sibling, and possibly a new root) are NOT atomic;
/// a crash between those writes can leave the tree inconsistent.
pub struct DiskManager {
    file: File,
    /// Number of pages in the file.
    page_count: u32,
}

impl DiskManager {
    /// Create a new index file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
        })
    }

    /// Open an existing index file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        // Calculate page count from file size
        let metadata = file.metadata()?;
        let file_size = metadata.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self { file, page_count })
    }

    /// Open an existing index file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Read a page from disk.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page doesn't exist.
    pub fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        if page_id.0 >= self.page_count {
            return Err(crate::common::Error::PageNotFound(page_id.0));
        }

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;

        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        Ok(page)
    }

    /// Write a page to disk.
    ///
    /// The page must have been previously allocated with `allocate_page()`.
    ///
    /// # Durability
    /// This method calls `fsync()` after writing.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page hasn't been allocated.
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if page_id.0 >= self.page_count {
            return Err(crate::common::Error::PageNotFound(page_id.0));
        }

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_all()?; // fsync for durability

        Ok(())
    }

    /// Allocate a new page on disk.
    ///
    /// Returns the `PageId` of the newly allocated page: always one past
    /// the current highest page (the `endPid` convention). The page is
    /// initialized with zeros.
    pub fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = PageId::new(self.page_count);

        // Extend file with a zeroed page
        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;

        let zeros = [0u8; PAGE_SIZE];
        self.file.write_all(&zeros)?;
        self.file.sync_all()?;

        self.page_count += 1;
        Ok(page_id)
    }

    /// Get the number of pages in the index file.
    ///
    /// Equivalently: the id the next `allocate_page()` call will return.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Get the total size of the index file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }
}
