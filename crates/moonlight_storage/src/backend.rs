//! Storage backend trait definition.

use crate::error::StorageResult;

/// A whole-unit storage backend for MoonlightDB.
///
/// Each backend holds one persisted unit, which in practice is one
/// collection. The content is an opaque byte blob; MoonlightDB owns the
/// interpretation of the bytes.
///
/// # Invariants
///
/// - `read_all` returns exactly the bytes of the last successful `replace`
/// - `replace` is all-or-nothing: a failed or interrupted replace leaves
///   the previous content readable
/// - After `remove`, `exists` is false and `read_all` fails with
///   [`StorageError::NotFound`](crate::StorageError::NotFound)
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Returns true if the unit currently exists.
    fn exists(&self) -> bool;

    /// Reads the full content of the unit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the unit does not exist, or an I/O error.
    fn read_all(&self) -> StorageResult<Vec<u8>>;

    /// Replaces the full content of the unit, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the new content could not be made durable. The
    /// previous content is left intact in that case.
    fn replace(&self, data: &[u8]) -> StorageResult<()>;

    /// Removes the unit.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the unit does not exist, or an I/O error.
    fn remove(&self) -> StorageResult<()>;

    /// Returns the current size of the unit in bytes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the unit does not exist.
    fn size(&self) -> StorageResult<u64>;
}
