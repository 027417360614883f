//! Error types for BurrowDB.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in BurrowDB.
///
/// A single error type keeps error handling consistent across the storage
/// and index layers. The variants fall into three groups:
/// - I/O failures (`Io`, `PageNotFound`): propagated unchanged to callers.
/// - Expected search outcomes (`NoSuchRecord`, `CursorExhausted`): normal
///   results of lookups and scans, not faults.
/// - Internal signals (`NodeFull`): drive the split logic inside the tree
///   manager and never escape the public API.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page does not exist on disk.
    #[error("page {0} not found")]
    PageNotFound(u32),

    /// The provided page id is invalid (the reserved sentinel value).
    #[error("invalid page id: {0}")]
    InvalidPageId(u32),

    /// A node has no room for another entry.
    ///
    /// Purely internal: the tree manager catches this and splits the node.
    /// Observing it outside `index::btree` indicates a bug.
    #[error("node is full")]
    NodeFull,

    /// Search key not present, or entry index out of range.
    ///
    /// This is a normal outcome of `locate`/`read_entry`, not a fault.
    #[error("no such record")]
    NoSuchRecord,

    /// A forward scan ran off the end of the leaf chain.
    ///
    /// Distinct from [`Error::NoSuchRecord`] so callers can tell
    /// end-of-iteration apart from a search miss.
    #[error("cursor exhausted")]
    CursorExhausted,

    /// A page failed checksum verification on read.
    #[error("checksum mismatch on page {0}")]
    ChecksumMismatch(u32),
}
