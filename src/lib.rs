//! BurrowDB - a disk-resident B+Tree index over fixed-size pages.
//!
//! # Architecture
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        BurrowDB                           │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────────────────────────────────┐   │
//! │  │           Tree Manager (index/btree/tree)          │   │
//! │  │   root/height bookkeeping · recursive insert       │   │
//! │  │   with split propagation · search · cursors        │   │
//! │  └───────────────────────────────────────────────────┘   │
//! │                           ↓                               │
//! │  ┌───────────────────────────────────────────────────┐   │
//! │  │       Node Codec (index/btree/{leaf,internal})     │   │
//! │  │   in-page layout · locate · insert · split         │   │
//! │  └───────────────────────────────────────────────────┘   │
//! │                           ↓                               │
//! │  ┌───────────────────────────────────────────────────┐   │
//! │  │             Storage Layer (storage/)               │   │
//! │  │     DiskManager + Page + PageHeader/checksums      │   │
//! │  └───────────────────────────────────────────────────┘   │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, RecordId, Error, config)
//! - [`storage`] - Disk I/O and page formats
//! - [`index`] - The B+Tree itself
//!
//! # Quick Start
//! ```no_run
//! use burrowdb::{BTreeIndex, RecordId};
//!
//! let mut index = BTreeIndex::open("orders.idx").unwrap();
//! index.insert(42, RecordId::new(7, 3)).unwrap();
//!
//! // Range scan starting at the first key >= 40
//! let (mut cursor, _exact) = index.locate(40).unwrap();
//! while let Ok((key, rid, next)) = index.read_forward(cursor) {
//!     println!("{key} -> {rid}");
//!     cursor = next;
//! }
//! index.close().unwrap();
//! ```
//!
//! # Limitations
//! - No deletion: nodes never merge and the height never shrinks.
//! - Single-writer, single-threaded: callers serialize access to an
//!   open tree.
//! - Multi-page split sequences (node, sibling, possibly a new root,
//!   metadata on close) are not written atomically. A crash in between
//!   can leave a promoted key unindexed in its parent or a new root
//!   unpersisted; page checksums detect torn pages but there is no
//!   write-ahead log to repair them.

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, PageId, RecordId, Result};

pub use index::btree::{BTreeIndex, IndexCursor, InternalNode, LeafNode};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::DiskManager;
