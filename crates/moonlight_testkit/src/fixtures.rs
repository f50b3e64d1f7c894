//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use moonlight_core::{Config, Database};
use std::path::Path;
use tempfile::TempDir;

/// A database in a temporary directory, removed on drop.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestDatabase {
    /// Creates a database with default configuration.
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Creates a database with compact output, no fsync and a fixed id
    /// seed. Suited for tests that write a lot.
    pub fn fast() -> Self {
        Self::with_config(|config| config.pretty(false).sync_on_write(false).id_seed(0))
    }

    /// Creates a database after adjusting the default configuration.
    pub fn with_config(configure: impl FnOnce(Config) -> Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open(configure(Config::new(temp_dir.path())))
            .expect("Failed to open database");
        Self { db, temp_dir }
    }

    /// Returns the root directory the database lives in.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Closes the database and opens it again on the same directory.
    pub fn reopen(self) -> Self {
        let Self { db, temp_dir } = self;
        let config = db.config().clone();
        drop(db);
        let db = Database::open(config).expect("Failed to reopen database");
        Self { db, temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary database.
///
/// # Example
///
/// ```rust,ignore
/// use moonlight_testkit::with_temp_db;
///
/// #[test]
/// fn my_test() {
///     with_temp_db(|db| {
///         let users = db.create_collection("users").unwrap();
///         // ... test operations
///     });
/// }
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::new();
    f(&test_db.db)
}

/// Runs a test with a temporary database and its root path.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::new();
    f(&test_db.db, test_db.path())
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use moonlight_core::Record;

    /// Creates a database whose `test` collection holds `count` records of
    /// the form `{"index": i, "parity": "even" | "odd"}`.
    pub fn populated_database(count: usize) -> TestDatabase {
        let test_db = TestDatabase::fast();
        let collection = test_db
            .create_collection("test")
            .expect("Failed to create collection");

        if count > 0 {
            let records = (0..count).map(indexed_record).collect();
            collection.insert_many(records).expect("Failed to insert records");
        }

        test_db
    }

    /// Creates a database with `count` collections named `collection_<i>`,
    /// each holding one record.
    pub fn multi_collection_database(count: usize) -> (TestDatabase, Vec<String>) {
        let test_db = TestDatabase::fast();
        let mut names = Vec::with_capacity(count);

        for i in 0..count {
            let name = format!("collection_{i}");
            test_db
                .create_collection(&name)
                .expect("Failed to create collection")
                .insert_one(Record::new().with("collection", i as i64))
                .expect("Failed to insert record");
            names.push(name);
        }

        (test_db, names)
    }

    /// The record stored at position `i` by [`populated_database`].
    pub fn indexed_record(i: usize) -> Record {
        let parity = if i % 2 == 0 { "even" } else { "odd" };
        Record::new()
            .with("index", i as i64)
            .with("parity", parity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonlight_core::Filter;

    #[test]
    fn test_database_starts_empty() {
        let test_db = TestDatabase::new();
        assert!(test_db.collections().unwrap().is_empty());
        assert!(test_db.path().join("moonlight_db").is_dir());
    }

    #[test]
    fn test_with_temp_db() {
        with_temp_db(|db| {
            db.create_collection("test").unwrap();
            assert!(db.has_collection("test"));
        });
    }

    #[test]
    fn test_reopen_keeps_data() {
        let test_db = scenarios::populated_database(4);
        let test_db = test_db.reopen();

        let collection = test_db.collection("test").unwrap();
        assert_eq!(collection.count().unwrap(), 4);
    }

    #[test]
    fn test_populated_scenario() {
        let test_db = scenarios::populated_database(10);
        let collection = test_db.collection("test").unwrap();

        assert_eq!(collection.count().unwrap(), 10);
        assert_eq!(collection.find(&Filter::eq("parity", "odd")).unwrap().len(), 5);
    }

    #[test]
    fn test_multi_collection_scenario() {
        let (test_db, names) = scenarios::multi_collection_database(3);
        assert_eq!(test_db.collections().unwrap(), names);
    }
}
