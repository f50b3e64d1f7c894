//! Database configuration.

use std::path::{Path, PathBuf};

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root storage location. The database lives in `<path>/moonlight_db`.
    pub path: PathBuf,

    /// Whether to create the directory layout if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to hold an advisory lock that keeps other processes out.
    pub exclusive_lock: bool,

    /// Whether collection files are written pretty-printed.
    pub pretty: bool,

    /// Whether to fsync every collection rewrite (safer but slower).
    pub sync_on_write: bool,

    /// Seed for the record identifier generator. `None` seeds from the OS.
    pub id_seed: Option<u64>,
}

impl Config {
    /// Creates a configuration for the given root with default values.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            create_if_missing: true,
            exclusive_lock: true,
            pretty: true,
            sync_on_write: true,
            id_seed: None,
        }
    }

    /// Sets whether to create the layout if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to take the cross-process lock.
    #[must_use]
    pub const fn exclusive_lock(mut self, value: bool) -> Self {
        self.exclusive_lock = value;
        self
    }

    /// Sets whether collection files are pretty-printed.
    #[must_use]
    pub const fn pretty(mut self, value: bool) -> Self {
        self.pretty = value;
        self
    }

    /// Sets whether to sync every rewrite.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Makes identifier generation deterministic.
    #[must_use]
    pub const fn id_seed(mut self, seed: u64) -> Self {
        self.id_seed = Some(seed);
        self
    }
}
