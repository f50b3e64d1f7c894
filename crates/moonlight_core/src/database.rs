//! Database facade: collection lifecycle over a directory.

use crate::collection::Collection;
use crate::config::Config;
use crate::dir::DatabaseDir;
use crate::error::{CoreError, CoreResult};
use crate::id::IdGenerator;
use moonlight_storage::{FileBackend, StorageBackend, StorageError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Content of a freshly created collection.
const EMPTY_COLLECTION: &[u8] = b"[]";

/// The main database handle.
///
/// `Database` is the entry point for MoonlightDB. It owns the directory
/// layout and hands out [`Collection`] handles. It keeps no record data in
/// memory; every collection call reads from and writes back to disk.
///
/// # Opening a Database
///
/// ```rust,ignore
/// use moonlight_core::{Config, Database};
///
/// let db = Database::open(Config::new("data"))?;
/// let users = db.create_collection("users")?;
/// assert_eq!(db.collections()?, ["users"]);
/// ```
///
/// # Concurrency
///
/// Handles for the same collection share one lock, so calls from different
/// threads are serialized per collection. With `exclusive_lock` enabled the
/// directory's `LOCK` file keeps other processes out.
pub struct Database {
    /// Configuration.
    config: Config,
    /// Directory layout (holds the lock).
    dir: DatabaseDir,
    /// Identifier source shared by all collections.
    ids: Arc<IdGenerator>,
    /// Per-collection locks, created on first use and pruned on delete.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Database {
    /// Opens a database with the given configuration.
    ///
    /// The layout below `config.path` is created if it is missing and
    /// `create_if_missing` is set.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the layout is missing and may not be created
    /// - `DatabaseLocked` if another process holds the directory
    pub fn open(config: Config) -> CoreResult<Self> {
        let dir = DatabaseDir::open(&config.path, config.create_if_missing, config.exclusive_lock)?;
        let ids = Arc::new(IdGenerator::new(config.id_seed));

        info!("Opened database at {:?}", dir.root());
        Ok(Self {
            config,
            dir,
            ids,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Opens a database at `path` with default configuration.
    pub fn open_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::open(Config::new(path))
    }

    /// Returns a handle to an existing collection.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` if the collection does not exist.
    pub fn collection(&self, name: &str) -> CoreResult<Collection> {
        validate_name(name)?;
        let backend = self.backend(name);
        if !backend.exists() {
            return Err(CoreError::collection_not_found(name));
        }
        Ok(self.handle(name, backend))
    }

    /// Creates an empty collection and returns a handle to it.
    ///
    /// # Errors
    ///
    /// Returns `CollectionExists` if the name is taken.
    pub fn create_collection(&self, name: &str) -> CoreResult<Collection> {
        validate_name(name)?;
        let lock = self.lock_for(name);
        let _guard = lock.lock();

        let backend = FileBackend::create_new(&self.dir.collection_path(name), EMPTY_COLLECTION)
            .map_err(|e| match e {
                StorageError::AlreadyExists { .. } => CoreError::collection_exists(name),
                other => CoreError::Storage(other),
            })?
            .with_sync(self.config.sync_on_write);

        info!("Created collection {}", name);
        Ok(self.handle(name, backend))
    }

    /// Deletes a collection and all of its records.
    ///
    /// Handles obtained earlier report `CollectionNotFound` afterwards.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` if the collection does not exist.
    pub fn delete_collection(&self, name: &str) -> CoreResult<()> {
        validate_name(name)?;
        let removed = {
            let lock = self.lock_for(name);
            let _guard = lock.lock();
            self.backend(name).remove()
        };
        self.prune_locks();

        removed.map_err(|e| match e {
            StorageError::NotFound { .. } => CoreError::collection_not_found(name),
            other => CoreError::Storage(other),
        })?;

        info!("Deleted collection {}", name);
        Ok(())
    }

    /// Lists existing collection names in sorted order.
    pub fn collections(&self) -> CoreResult<Vec<String>> {
        self.dir.collection_names()
    }

    /// Returns true if the collection exists.
    #[must_use]
    pub fn has_collection(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.dir.collection_path(name).is_file()
    }

    /// Returns the root path the database was opened at.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.root()
    }

    /// Returns database configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn backend(&self, name: &str) -> FileBackend {
        FileBackend::new(&self.dir.collection_path(name)).with_sync(self.config.sync_on_write)
    }

    fn handle(&self, name: &str, backend: FileBackend) -> Collection {
        Collection::new(
            name.to_string(),
            Arc::new(backend),
            self.lock_for(name),
            Arc::clone(&self.ids),
            self.config.pretty,
        )
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Drops locks that no handle holds any more.
    fn prune_locks(&self) {
        self.locks.lock().retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path())
            .field("pretty", &self.config.pretty)
            .finish_non_exhaustive()
    }
}

/// Rejects names that are empty or could escape the collections directory.
fn validate_name(name: &str) -> CoreResult<()> {
    if name.is_empty() {
        return Err(CoreError::invalid_argument("collection name is empty"));
    }
    if name.contains(['/', '\\', '\0']) || name.contains("..") {
        return Err(CoreError::invalid_argument(format!(
            "invalid collection name: {name:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::query::{Filter, Update};
    use moonlight_codec::{Record, Value};
    use std::fs;
    use tempfile::tempdir;

    fn open(path: &Path) -> Database {
        Database::open(Config::new(path)).unwrap()
    }

    #[test]
    fn open_creates_layout() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());

        assert!(temp.path().join("moonlight_db/collections").is_dir());
        assert!(temp.path().join("moonlight_db/settings").is_dir());
        assert!(db.collections().unwrap().is_empty());
        assert_eq!(db.path(), temp.path());
    }

    #[test]
    fn open_without_create_fails_on_missing_layout() {
        let temp = tempdir().unwrap();
        let err = Database::open(Config::new(temp.path()).create_if_missing(false)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
    }

    #[test]
    fn second_open_is_locked() {
        let temp = tempdir().unwrap();
        let _db = open(temp.path());

        let err = Database::open_path(temp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Locked);
    }

    #[test]
    fn create_collection_writes_empty_array() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());
        let users = db.create_collection("users").unwrap();

        assert_eq!(users.name(), "users");
        assert_eq!(users.count().unwrap(), 0);
        let content =
            fs::read_to_string(temp.path().join("moonlight_db/collections/users.dat")).unwrap();
        assert_eq!(content, "[]");
    }

    #[test]
    fn create_existing_collection_fails() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());
        let users = db.create_collection("users").unwrap();
        users.insert_one(Record::new().with("a", 1)).unwrap();

        let err = db.create_collection("users").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        // Existing content is untouched.
        assert_eq!(users.count().unwrap(), 1);
    }

    #[test]
    fn collection_requires_existing_file() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());

        let err = db.collection("missing").unwrap_err();
        assert!(matches!(err, CoreError::CollectionNotFound { ref name } if name == "missing"));
        assert!(!db.has_collection("missing"));

        db.create_collection("present").unwrap();
        assert!(db.has_collection("present"));
        assert_eq!(db.collection("present").unwrap().count().unwrap(), 0);
    }

    #[test]
    fn collections_lists_sorted_names() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());
        db.create_collection("zeta").unwrap();
        db.create_collection("alpha").unwrap();

        assert_eq!(db.collections().unwrap(), ["alpha", "zeta"]);
    }

    #[test]
    fn delete_collection_removes_file() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());
        let users = db.create_collection("users").unwrap();
        users.insert_one(Record::new().with("a", 1)).unwrap();

        db.delete_collection("users").unwrap();
        assert!(!db.has_collection("users"));
        assert!(db.collections().unwrap().is_empty());

        // Stale handles do not resurrect the file.
        let err = users.insert_one(Record::new().with("a", 2)).unwrap_err();
        assert!(matches!(err, CoreError::CollectionNotFound { .. }));
        assert!(!db.has_collection("users"));

        let err = db.delete_collection("users").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_releases_unused_locks() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());

        for i in 0..50 {
            assert!(db.delete_collection(&format!("missing_{i}")).is_err());
        }
        assert!(db.locks.lock().is_empty());

        drop(db.create_collection("gone").unwrap());
        let kept = db.create_collection("kept").unwrap();
        db.delete_collection("gone").unwrap();
        assert_eq!(db.locks.lock().keys().collect::<Vec<_>>(), ["kept"]);

        // A live handle keeps sharing its lock with new handles.
        let again = db.collection("kept").unwrap();
        kept.insert_one(Record::new().with("a", 1)).unwrap();
        assert_eq!(again.count().unwrap(), 1);
    }

    #[test]
    fn recreate_after_delete_starts_empty() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());
        db.create_collection("c").unwrap().insert_one(Record::new().with("a", 1)).unwrap();
        db.delete_collection("c").unwrap();

        assert_eq!(db.create_collection("c").unwrap().count().unwrap(), 0);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());

        for name in ["", "a/b", "a\\b", "..", "../etc", "nul\0"] {
            let err = db.create_collection(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "name {name:?}");
            assert!(!db.has_collection(name));
        }
    }

    #[test]
    fn data_survives_reopen() {
        let temp = tempdir().unwrap();
        {
            let db = open(temp.path());
            let users = db.create_collection("users").unwrap();
            users.insert_one(Record::new().with("name", "user_123").with("xp", "99999")).unwrap();
            users
                .update(
                    &Filter::eq("name", "user_123"),
                    &Update::set(Record::new().with("xp", "0")),
                )
                .unwrap();
        }

        let db = open(temp.path());
        let users = db.collection("users").unwrap();
        let found = users.find_one(&Filter::eq("name", "user_123")).unwrap();
        assert_eq!(found.get("xp"), Some(&Value::from("0")));
    }

    #[test]
    fn pretty_output_uses_tabs() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());
        db.create_collection("c").unwrap().insert_one(Record::new().with("a", 1)).unwrap();

        let content =
            fs::read_to_string(temp.path().join("moonlight_db/collections/c.dat")).unwrap();
        assert!(content.contains("\n\t{"), "content: {content}");
    }

    #[test]
    fn compact_output() {
        let temp = tempdir().unwrap();
        let db = Database::open(Config::new(temp.path()).pretty(false).id_seed(1)).unwrap();
        db.create_collection("c").unwrap().insert_one(Record::new().with("a", 1)).unwrap();

        let content =
            fs::read_to_string(temp.path().join("moonlight_db/collections/c.dat")).unwrap();
        assert!(!content.contains('\n'));
        assert!(content.ends_with(r#","a":1}]"#), "content: {content}");
    }

    #[test]
    fn handles_share_state() {
        let temp = tempdir().unwrap();
        let db = open(temp.path());
        let a = db.create_collection("c").unwrap();
        let b = db.collection("c").unwrap();

        a.insert_one(Record::new().with("k", 1)).unwrap();
        assert_eq!(b.count().unwrap(), 1);
    }

    #[test]
    fn seeded_databases_generate_same_ids() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let a = Database::open(Config::new(first.path()).id_seed(3)).unwrap();
        let b = Database::open(Config::new(second.path()).id_seed(3)).unwrap();

        let id_a = a.create_collection("c").unwrap().insert_one(Record::new().with("x", 1));
        let id_b = b.create_collection("c").unwrap().insert_one(Record::new().with("x", 1));
        assert_eq!(id_a.unwrap(), id_b.unwrap());
    }
}
