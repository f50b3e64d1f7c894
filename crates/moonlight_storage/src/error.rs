//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The persisted unit does not exist.
    #[error("storage unit not found: {}", path.display())]
    NotFound {
        /// Location of the missing unit.
        path: PathBuf,
    },

    /// The persisted unit already exists.
    #[error("storage unit already exists: {}", path.display())]
    AlreadyExists {
        /// Location of the existing unit.
        path: PathBuf,
    },
}

impl StorageError {
    /// Returns true if this error reports a missing unit.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Maps an I/O error on `path`, turning `NotFound` and `AlreadyExists`
    /// into their dedicated variants.
    pub(crate) fn from_io(err: io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => Self::Io(err),
        }
    }
}
