//! Database directory management.
//!
//! This module handles the file system layout for MoonlightDB:
//!
//! ```text
//! <root>/
//! └─ moonlight_db/
//!    ├─ LOCK                   # Advisory lock for single-process access
//!    ├─ collections/
//!    │  └─ <name>.dat          # One JSON array per collection
//!    └─ settings/              # Reserved for application settings
//! ```
//!
//! A collection exists exactly when its `.dat` file exists; there is no
//! separate catalog.

use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Directory holding the whole database below the root.
const DB_DIR: &str = "moonlight_db";
const COLLECTIONS_DIR: &str = "collections";
const SETTINGS_DIR: &str = "settings";
const LOCK_FILE: &str = "LOCK";

/// Extension of collection files.
pub const COLLECTION_EXT: &str = "dat";

/// Manages the database directory structure and optional file locking.
///
/// # Example
///
/// ```rust,ignore
/// use moonlight_core::dir::DatabaseDir;
/// use std::path::Path;
///
/// let dir = DatabaseDir::open(Path::new("data"), true, true)?;
/// println!("users live at {:?}", dir.collection_path("users"));
/// ```
#[derive(Debug)]
pub struct DatabaseDir {
    /// Root directory path as configured.
    root: PathBuf,
    /// `<root>/moonlight_db`.
    db_path: PathBuf,
    /// Lock file handle, held while the database is open.
    _lock_file: Option<File>,
}

impl DatabaseDir {
    /// Opens or creates a database directory.
    ///
    /// # Arguments
    ///
    /// * `root` - Root storage location
    /// * `create_if_missing` - Create the layout if it doesn't exist
    /// * `exclusive` - Take an advisory lock that keeps other processes out
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The layout doesn't exist and `create_if_missing` is false
    /// - Another process holds the lock (`DatabaseLocked`)
    /// - I/O errors occur
    pub fn open(root: &Path, create_if_missing: bool, exclusive: bool) -> CoreResult<Self> {
        let db_path = root.join(DB_DIR);
        let collections = db_path.join(COLLECTIONS_DIR);

        if !collections.is_dir() {
            if !create_if_missing {
                return Err(CoreError::invalid_format(format!(
                    "database directory does not exist: {}",
                    db_path.display()
                )));
            }
            fs::create_dir_all(&collections)?;
            fs::create_dir_all(db_path.join(SETTINGS_DIR))?;
        }

        let lock_file = if exclusive {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(db_path.join(LOCK_FILE))?;

            if file.try_lock_exclusive().is_err() {
                return Err(CoreError::DatabaseLocked);
            }
            Some(file)
        } else {
            None
        };

        Ok(Self {
            root: root.to_path_buf(),
            db_path,
            _lock_file: lock_file,
        })
    }

    /// Returns the configured root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path to the collections directory.
    #[must_use]
    pub fn collections_dir(&self) -> PathBuf {
        self.db_path.join(COLLECTIONS_DIR)
    }

    /// Returns the path to the settings directory.
    #[must_use]
    pub fn settings_dir(&self) -> PathBuf {
        self.db_path.join(SETTINGS_DIR)
    }

    /// Returns the path of a collection file.
    #[must_use]
    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.collections_dir()
            .join(format!("{name}.{COLLECTION_EXT}"))
    }

    /// Lists collection names, sorted.
    ///
    /// Returns an empty list if the collections directory is absent.
    pub fn collection_names(&self) -> CoreResult<Vec<String>> {
        let dir = self.collections_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(COLLECTION_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
