//! Integration tests for database lifecycle, persistence and concurrency.

use moonlight_core::{
    is_valid_id, Config, CoreError, Database, ErrorKind, Filter, Record, Update, Value,
};
use moonlight_testkit::{scenarios, stress_concurrent_inserts, StressConfig, TestDatabase};
use std::sync::Arc;
use std::thread;

#[test]
fn collection_lifecycle() {
    let db = TestDatabase::new();

    db.create_collection("users").unwrap();
    let err = db.create_collection("users").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert!(matches!(err, CoreError::CollectionExists { .. }));

    db.delete_collection("users").unwrap();
    let err = db.delete_collection("users").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = db.collection("users").unwrap_err();
    assert!(matches!(err, CoreError::CollectionNotFound { .. }));
}

#[test]
fn collections_reflect_directory() {
    let db = TestDatabase::new();
    for name in ["b", "a", "c"] {
        db.create_collection(name).unwrap();
    }
    db.delete_collection("b").unwrap();

    assert_eq!(db.collections().unwrap(), ["a", "c"]);

    // A file dropped in by hand is a collection too.
    std::fs::write(db.path().join("moonlight_db/collections/manual.dat"), "[]").unwrap();
    assert_eq!(db.collections().unwrap(), ["a", "c", "manual"]);
    assert_eq!(db.collection("manual").unwrap().count().unwrap(), 0);
}

#[test]
fn data_persists_across_reopen() {
    let db = TestDatabase::new();
    let users = db.create_collection("users").unwrap();
    let id = users
        .insert_one(Record::new().with("name", "user_123").with("xp", "99999"))
        .unwrap();
    users
        .update_one(
            &Filter::eq("name", "user_123"),
            &Update::set(Record::new().with("xp", "0")),
        )
        .unwrap();
    drop(users);

    let db = db.reopen();
    let users = db.collection("users").unwrap();
    let found = users.find_one(&Filter::eq("_id", id)).unwrap();
    assert_eq!(found.get("xp"), Some(&Value::from("0")));
    assert_eq!(found.get("name"), Some(&Value::from("user_123")));
}

#[test]
fn file_is_tab_indented_json_array() {
    let db = TestDatabase::with_config(|c| c.id_seed(11));
    let coll = db.create_collection("c").unwrap();
    coll.insert_one(Record::new().with("a", 1)).unwrap();

    let text = std::fs::read_to_string(db.path().join("moonlight_db/collections/c.dat")).unwrap();
    assert!(text.starts_with("[\n\t{\n\t\t\"_id\": \""), "text: {text}");
    assert!(text.ends_with("\t}\n]"), "text: {text}");

    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(1));
    assert_eq!(parsed[0]["a"], serde_json::json!(1));
}

#[test]
fn no_temp_file_left_behind() {
    let db = scenarios::populated_database(5);
    let coll = db.collection("test").unwrap();
    coll.delete(&Filter::eq("parity", "odd")).unwrap();

    let dir = db.path().join("moonlight_db/collections");
    let names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["test.dat"]);
}

#[test]
fn concurrent_inserts_lose_no_records() {
    let db = TestDatabase::fast();
    let coll = db.create_collection("shared").unwrap();
    let config = StressConfig {
        operations: 400,
        threads: 8,
        payload_size: 8,
        key_count: 400,
    };

    let result = stress_concurrent_inserts(&coll, &config);
    assert_eq!(result.failed_ops, 0);
    assert_eq!(coll.count().unwrap(), 400);
}

#[test]
fn handles_from_separate_lookups_share_lock() {
    let db = Arc::new(TestDatabase::fast());
    db.create_collection("shared").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                let coll = db.collection("shared").unwrap();
                for i in 0..25i64 {
                    coll.insert_one(Record::new().with("t", t).with("i", i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(db.collection("shared").unwrap().count().unwrap(), 100);
}

#[test]
fn seeded_ids_are_deterministic() {
    let run = || {
        let db = TestDatabase::with_config(|c| c.id_seed(2024));
        let coll = db.create_collection("c").unwrap();
        coll.insert_many((0..5i64).map(|i| Record::new().with("i", i)).collect())
            .unwrap()
    };

    let first = run();
    assert_eq!(first, run());
    assert!(first.iter().all(|id| is_valid_id(id.as_text().unwrap())));
}

#[test]
fn second_process_is_locked_out() {
    let db = TestDatabase::new();
    let err = Database::open(Config::new(db.path())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Locked);

    // Unlocked opens skip the check.
    let shared = Database::open(Config::new(db.path()).exclusive_lock(false));
    assert!(shared.is_ok());
}
