//! # MoonlightDB Storage
//!
//! Storage backend trait and implementations for MoonlightDB.
//!
//! A backend owns exactly one persisted unit (one collection file) and
//! treats it as an **opaque byte blob**: it can be read in full, replaced
//! in full, or removed. Backends know nothing about records or JSON.
//!
//! ## Design Principles
//!
//! - Whole-unit reads and writes only; there is no append log
//! - A replace either lands completely or not at all
//! - Must be `Send + Sync` so collection handles can be shared
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use moonlight_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.replace(b"[]").unwrap();
//! assert_eq!(backend.read_all().unwrap(), b"[]");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
