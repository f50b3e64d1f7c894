//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix appended to the unit path for the in-flight replacement file.
const TEMP_SUFFIX: &str = ".tmp";

/// A file-based storage backend.
///
/// The unit is a single file. Replacing it writes the new content to a
/// sibling temporary file and renames it over the original, so readers
/// observe either the old or the new content, never a truncated file.
///
/// # Durability
///
/// With `sync` enabled (the default), the temporary file is `sync_all`ed
/// before the rename and the parent directory is synced afterwards.
///
/// # Thread Safety
///
/// Replacements through one backend instance are serialized by an
/// internal lock, so the temporary file is never shared by two writers.
///
/// # Example
///
/// ```no_run
/// use moonlight_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::new(Path::new("users.dat"));
/// backend.replace(b"[]").unwrap();
/// assert_eq!(backend.read_all().unwrap(), b"[]");
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    sync: bool,
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Creates a backend for the file at `path`.
    ///
    /// Nothing is touched on disk until the first operation.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            sync: true,
            write_lock: Mutex::new(()),
        }
    }

    /// Sets whether replacements are fsynced before returning.
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Creates a new file at `path` holding `data`.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if a file is already present at `path`.
    pub fn create_new(path: &Path, data: &[u8]) -> StorageResult<Self> {
        let backend = Self::new(path);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| StorageError::from_io(e, path))?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);
        backend.sync_parent()?;
        Ok(backend)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the temporary file used during replacement.
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(TEMP_SUFFIX);
        PathBuf::from(name)
    }

    /// Syncs the parent directory so a rename or unlink is durable.
    ///
    /// Directory fsync is not available on Windows; NTFS journaling covers
    /// metadata durability there.
    #[cfg(unix)]
    fn sync_parent(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                File::open(parent)?.sync_all()?;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_all(&self) -> StorageResult<Vec<u8>> {
        fs::read(&self.path).map_err(|e| StorageError::from_io(e, &self.path))
    }

    fn replace(&self, data: &[u8]) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let temp_path = self.temp_path();

        let result = (|| -> StorageResult<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(data)?;
            if self.sync {
                file.sync_all()?;
            }
            drop(file);
            fs::rename(&temp_path, &self.path)?;
            Ok(())
        })();

        if result.is_err() {
            // Best effort; the original file is still intact.
            let _ = fs::remove_file(&temp_path);
            return result;
        }

        if self.sync {
            self.sync_parent()?;
        }
        Ok(())
    }

    fn remove(&self) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        fs::remove_file(&self.path).map_err(|e| StorageError::from_io(e, &self.path))?;
        if self.sync {
            self.sync_parent()?;
        }
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        let metadata =
            fs::metadata(&self.path).map_err(|e| StorageError::from_io(e, &self.path))?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_missing_until_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.dat");

        let backend = FileBackend::new(&path);
        assert!(!backend.exists());
        assert!(!path.exists());

        let result = backend.read_all();
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn file_replace_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.dat");

        let backend = FileBackend::new(&path);
        backend.replace(b"hello").unwrap();
        assert_eq!(backend.read_all().unwrap(), b"hello");

        backend.replace(b"hi").unwrap();
        assert_eq!(backend.read_all().unwrap(), b"hi");
        assert_eq!(backend.size().unwrap(), 2);
    }

    #[test]
    fn file_replace_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.dat");

        let backend = FileBackend::new(&path);
        backend.replace(b"[]").unwrap();

        assert!(!backend.temp_path().exists());
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn file_replace_fails_cleanly_when_directory_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("test.dat");

        let backend = FileBackend::new(&path);
        assert!(backend.replace(b"[]").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.dat");

        {
            let backend = FileBackend::new(&path);
            backend.replace(b"persistent data").unwrap();
        }

        let backend = FileBackend::new(&path);
        assert_eq!(backend.size().unwrap(), 15);
        assert_eq!(backend.read_all().unwrap(), b"persistent data");
    }

    #[test]
    fn file_create_new_rejects_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.dat");

        let backend = FileBackend::create_new(&path, b"[]").unwrap();
        assert_eq!(backend.read_all().unwrap(), b"[]");

        let result = FileBackend::create_new(&path, b"[]");
        assert!(matches!(result, Err(StorageError::AlreadyExists { .. })));
    }

    #[test]
    fn file_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.dat");

        let backend = FileBackend::new(&path);
        backend.replace(b"data").unwrap();
        backend.remove().unwrap();

        assert!(!backend.exists());
        assert!(backend.remove().unwrap_err().is_not_found());
    }

    #[test]
    fn file_without_sync() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.dat");

        let backend = FileBackend::new(&path).with_sync(false);
        backend.replace(b"fast").unwrap();
        assert_eq!(backend.read_all().unwrap(), b"fast");
    }

    #[test]
    fn file_temp_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.dat");

        let backend = FileBackend::new(&path);
        assert_eq!(backend.path(), path);
        assert_eq!(backend.temp_path(), dir.path().join("users.dat.tmp"));
    }
}
