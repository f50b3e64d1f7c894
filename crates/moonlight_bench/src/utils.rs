//! Benchmark utilities.

use moonlight_core::{Collection, Config, Database, Record};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tempfile::TempDir;

/// Generate a random alphanumeric string of the specified length.
pub fn random_text(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a record with a numeric key, a bucket for filtering and a
/// random payload.
pub fn generate_record(key: usize, payload_size: usize) -> Record {
    Record::new()
        .with("key", key as i64)
        .with("bucket", (key % 10) as i64)
        .with("payload", random_text(payload_size))
}

/// Generate test records with the specified payload size.
pub fn generate_records(count: usize, payload_size: usize) -> Vec<Record> {
    (0..count).map(|i| generate_record(i, payload_size)).collect()
}

/// Opens a compact, unsynced database in a fresh temp directory.
///
/// The directory must outlive the database.
pub fn bench_database() -> (TempDir, Database) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = Config::new(dir.path()).pretty(false).sync_on_write(false);
    let db = Database::open(config).expect("Failed to open database");
    (dir, db)
}

/// Creates a collection preloaded with `count` records.
pub fn populated_collection(db: &Database, name: &str, count: usize) -> Collection {
    let collection = db
        .create_collection(name)
        .expect("Failed to create collection");
    if count > 0 {
        collection
            .insert_many(generate_records(count, 64))
            .expect("Failed to populate collection");
    }
    collection
}
