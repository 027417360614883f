//! Disk-resident B+Tree index.
//!
//! # Components
//! - [`LeafNode`] / [`InternalNode`] - the node codec: in-page binary
//!   layout plus per-node operations (locate, insert-in-place, split).
//! - [`BTreeIndex`] - the tree manager: root/height bookkeeping,
//!   recursive insert with split propagation, key search, and
//!   cursor-based forward iteration.
//! - [`IndexCursor`] - a stable (leaf page, entry index) scan position.

mod cursor;
mod internal;
mod leaf;
mod tree;

pub use cursor::IndexCursor;
pub use internal::InternalNode;
pub use leaf::LeafNode;
pub use tree::BTreeIndex;
