//! Index structures.
//!
//! Currently a single index type: the disk-resident B+Tree in [`btree`].

pub mod btree;

pub use btree::{BTreeIndex, IndexCursor, InternalNode, LeafNode};
