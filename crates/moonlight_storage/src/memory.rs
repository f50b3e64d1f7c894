//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// An in-memory storage backend.
///
/// This backend keeps the unit in memory and is suitable for:
/// - Unit tests
/// - Ephemeral collections that don't need persistence
///
/// It also counts replacements, which lets tests assert whether an
/// operation wrote anything at all.
///
/// # Example
///
/// ```rust
/// use moonlight_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.replace(b"test data").unwrap();
/// assert_eq!(backend.size().unwrap(), 9);
/// assert_eq!(backend.write_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Option<Vec<u8>>>,
    writes: AtomicU64,
}

impl InMemoryBackend {
    /// Creates a new backend holding an existing, empty unit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_data(Vec::new())
    }

    /// Creates a new backend with pre-existing content.
    ///
    /// Useful for testing recovery and corruption scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(Some(data)),
            writes: AtomicU64::new(0),
        }
    }

    /// Creates a backend whose unit does not exist yet.
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    /// Returns a copy of the current content, if the unit exists.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }

    /// Returns how many successful replacements have happened.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    fn not_found() -> StorageError {
        StorageError::NotFound {
            path: PathBuf::from(":memory:"),
        }
    }
}

impl StorageBackend for InMemoryBackend {
    fn exists(&self) -> bool {
        self.data.read().is_some()
    }

    fn read_all(&self) -> StorageResult<Vec<u8>> {
        self.data.read().clone().ok_or_else(Self::not_found)
    }

    fn replace(&self, new_data: &[u8]) -> StorageResult<()> {
        *self.data.write() = Some(new_data.to_vec());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn remove(&self) -> StorageResult<()> {
        match self.data.write().take() {
            Some(_) => Ok(()),
            None => Err(Self::not_found()),
        }
    }

    fn size(&self) -> StorageResult<u64> {
        self.data
            .read()
            .as_ref()
            .map(|d| d.len() as u64)
            .ok_or_else(Self::not_found)
    }
}
