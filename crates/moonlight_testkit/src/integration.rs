//! Cross-crate integration test helpers.
//!
//! [`ModelHarness`] drives a real collection and an in-memory model with
//! the same calls and checks that they agree.

use crate::generators::CollectionOperation;
use moonlight_core::{Collection, CoreError, Filter, Record, Update, Value, ID_FIELD};

/// A test harness that mirrors a collection with a plain vector.
pub struct ModelHarness {
    /// The collection under test.
    pub collection: Collection,
    /// Expected content, in stored order.
    model: Vec<Record>,
}

impl ModelHarness {
    /// Creates a harness over an empty collection.
    ///
    /// # Panics
    ///
    /// Panics if the collection is not empty.
    pub fn new(collection: Collection) -> Self {
        assert_eq!(
            collection.count().expect("Failed to count records"),
            0,
            "Harness needs an empty collection"
        );
        Self {
            collection,
            model: Vec::new(),
        }
    }

    /// Inserts a record and tracks it under its returned `_id`.
    pub fn insert_one(&mut self, record: Record) -> Value {
        let id = self
            .collection
            .insert_one(record.clone())
            .expect("Failed to insert record");
        self.model.push(with_id(record, &id));
        id
    }

    /// Inserts a batch and tracks every record.
    pub fn insert_many(&mut self, records: Vec<Record>) -> Vec<Value> {
        let ids = self
            .collection
            .insert_many(records.clone())
            .expect("Failed to insert records");
        assert_eq!(ids.len(), records.len());
        self.model
            .extend(records.into_iter().zip(&ids).map(|(r, id)| with_id(r, id)));
        ids
    }

    /// Updates every match and checks the reported count.
    pub fn update(&mut self, filter: &Filter, update: &Update) -> usize {
        let matched = self
            .collection
            .update(filter, update)
            .expect("Failed to update records");

        let mut expected = 0;
        for record in self.model.iter_mut().filter(|r| filter.matches(r)) {
            update.apply(record);
            expected += 1;
        }
        assert_eq!(matched, expected, "Update count mismatch");
        matched
    }

    /// Updates the first match, or checks that nothing matched.
    pub fn update_one(&mut self, filter: &Filter, update: &Update) -> Option<Record> {
        let result = self.collection.update_one(filter, update);
        match self.model.iter_mut().find(|r| filter.matches(r)) {
            Some(record) => {
                update.apply(record);
                let actual = result.expect("Failed to update record");
                assert_eq!(actual, *record, "Updated record mismatch");
                Some(actual)
            }
            None => {
                assert_not_found(result);
                None
            }
        }
    }

    /// Deletes every match and checks the reported count.
    pub fn delete(&mut self, filter: &Filter) -> usize {
        let removed = self
            .collection
            .delete(filter)
            .expect("Failed to delete records");

        let before = self.model.len();
        self.model.retain(|r| !filter.matches(r));
        assert_eq!(removed, before - self.model.len(), "Delete count mismatch");
        removed
    }

    /// Deletes the first match, or checks that nothing matched.
    pub fn delete_one(&mut self, filter: &Filter) -> Option<Record> {
        let result = self.collection.delete_one(filter);
        match self.model.iter().position(|r| filter.matches(r)) {
            Some(idx) => {
                let expected = self.model.remove(idx);
                let actual = result.expect("Failed to delete record");
                assert_eq!(actual, expected, "Deleted record mismatch");
                Some(actual)
            }
            None => {
                assert_not_found(result);
                None
            }
        }
    }

    /// Applies a generated operation.
    pub fn apply(&mut self, operation: CollectionOperation) {
        match operation {
            CollectionOperation::InsertOne(record) => {
                self.insert_one(record);
            }
            CollectionOperation::InsertMany(records) => {
                self.insert_many(records);
            }
            CollectionOperation::Update { filter, update } => {
                self.update(&filter, &update);
            }
            CollectionOperation::UpdateOne { filter, update } => {
                self.update_one(&filter, &update);
            }
            CollectionOperation::Delete(filter) => {
                self.delete(&filter);
            }
            CollectionOperation::DeleteOne(filter) => {
                self.delete_one(&filter);
            }
        }
    }

    /// Verifies the collection holds exactly the model, in order.
    pub fn verify_all(&self) {
        let actual = self.collection.find_all().expect("Failed to read records");
        assert_eq!(actual, self.model, "Collection content mismatch");
        assert_eq!(
            self.collection.count().expect("Failed to count records"),
            self.model.len()
        );
    }

    /// Verifies `find` agrees with the model for `filter`.
    pub fn verify_find(&self, filter: &Filter) {
        let expected: Vec<&Record> = self.model.iter().filter(|r| filter.matches(r)).collect();
        match self.collection.find(filter) {
            Ok(found) => {
                if self.model.is_empty() {
                    assert!(found.is_empty());
                } else {
                    assert_eq!(found.iter().collect::<Vec<_>>(), expected);
                }
            }
            Err(e) => {
                assert!(
                    matches!(e, CoreError::RecordNotFound { .. }),
                    "Unexpected error: {e}"
                );
                assert!(!self.model.is_empty() && expected.is_empty());
            }
        }
    }

    /// Returns the count of tracked records.
    pub fn tracked_count(&self) -> usize {
        self.model.len()
    }
}

fn with_id(mut record: Record, id: &Value) -> Record {
    record.insert_first(ID_FIELD, id.clone());
    record
}

fn assert_not_found<T: std::fmt::Debug>(result: Result<T, CoreError>) {
    match result {
        Err(CoreError::RecordNotFound { .. }) => {}
        other => panic!("Expected RecordNotFound, got {other:?}"),
    }
}
