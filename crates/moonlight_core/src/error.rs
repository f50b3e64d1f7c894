//! Error types for MoonlightDB core.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in MoonlightDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] moonlight_storage::StorageError),

    /// JSON codec error.
    #[error("codec error: {0}")]
    Codec(#[from] moonlight_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Collection not found.
    #[error("collection not found: {name}")]
    CollectionNotFound {
        /// Name of the collection.
        name: String,
    },

    /// No record matched the filter.
    #[error("no matching record in collection {collection}")]
    RecordNotFound {
        /// The collection searched.
        collection: String,
    },

    /// Collection already exists.
    #[error("collection already exists: {name}")]
    CollectionExists {
        /// Name of the collection.
        name: String,
    },

    /// An argument was rejected before any work was done.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// The update document used an operation other than `$set`.
    #[error("unsupported update operation: {operation}")]
    UnsupportedOperation {
        /// The rejected operation.
        operation: String,
    },

    /// A collection file could not be interpreted.
    #[error("collection {collection} is corrupt: {message}")]
    CorruptStore {
        /// The affected collection.
        collection: String,
        /// Description of the corruption.
        message: String,
    },

    /// Database is already open in another process.
    #[error("database locked: another process has exclusive access")]
    DatabaseLocked,

    /// The database layout on disk is missing or invalid.
    #[error("invalid database format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },
}

/// Broad classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A collection or record is absent.
    NotFound,
    /// A collection with that name already exists.
    AlreadyExists,
    /// An empty record, empty batch or bad name was supplied.
    InvalidArgument,
    /// An update verb other than `$set` was supplied.
    UnsupportedOperation,
    /// Persisted content could not be parsed.
    CorruptStore,
    /// The database is held by another process.
    Locked,
    /// The underlying storage failed.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::AlreadyExists => "already exists",
            Self::InvalidArgument => "invalid argument",
            Self::UnsupportedOperation => "unsupported operation",
            Self::CorruptStore => "corrupt store",
            Self::Locked => "locked",
            Self::Io => "i/o",
        };
        f.write_str(name)
    }
}

impl CoreError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CollectionNotFound { .. } | Self::RecordNotFound { .. } => ErrorKind::NotFound,
            Self::CollectionExists { .. } => ErrorKind::AlreadyExists,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::CorruptStore { .. } | Self::Codec(_) | Self::InvalidFormat { .. } => {
                ErrorKind::CorruptStore
            }
            Self::DatabaseLocked => ErrorKind::Locked,
            Self::Storage(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns true for [`ErrorKind::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Creates a collection not found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Creates a record not found error.
    pub fn record_not_found(collection: impl Into<String>) -> Self {
        Self::RecordNotFound {
            collection: collection.into(),
        }
    }

    /// Creates a collection exists error.
    pub fn collection_exists(name: impl Into<String>) -> Self {
        Self::CollectionExists { name: name.into() }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported_operation(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Creates a corrupt store error.
    pub fn corrupt_store(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptStore {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}
