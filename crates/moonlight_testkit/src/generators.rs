//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use moonlight_core::{Filter, Record, Update, Value};
use proptest::prelude::*;

/// Field names used by the narrow generators, so filters hit often.
pub const FIELD_NAMES: &[&str] = &["a", "b", "c", "d"];

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("Invalid regex")
}

/// Strategy for scalar values.
///
/// Floats are multiples of 0.25 so they survive a JSON round trip exactly.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1_000_000i32..1_000_000).prop_map(|n| Value::Float(f64::from(n) / 4.0)),
        "[ -~]{0,16}".prop_map(Value::Text),
    ]
}

/// Strategy for arbitrary nested values.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z_]{1,8}", inner), 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

/// Strategy for arbitrary records with up to `max_fields` fields.
pub fn record_strategy(max_fields: usize) -> impl Strategy<Value = Record> {
    prop::collection::vec(("[a-z][a-z0-9_]{0,8}", value_strategy()), 0..=max_fields)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Strategy for a value drawn from a small domain.
pub fn narrow_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0i64..3).prop_map(Value::Integer),
        prop::sample::select(vec!["x", "y"]).prop_map(Value::from),
    ]
}

/// Strategy for non-empty records over [`FIELD_NAMES`] with narrow values.
pub fn narrow_record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::vec(
        (prop::sample::select(FIELD_NAMES), narrow_value_strategy()),
        1..=FIELD_NAMES.len(),
    )
    .prop_map(|fields| fields.into_iter().collect())
}

/// Strategy for filters with up to two clauses over [`FIELD_NAMES`].
pub fn filter_strategy() -> impl Strategy<Value = Filter> {
    prop::collection::vec(
        (prop::sample::select(FIELD_NAMES), narrow_value_strategy()),
        0..=2,
    )
    .prop_map(|clauses| Filter::from(clauses.into_iter().collect::<Record>()))
}

/// Strategy for `$set` updates over [`FIELD_NAMES`].
pub fn update_strategy() -> impl Strategy<Value = Update> {
    narrow_record_strategy().prop_map(Update::set)
}

/// A single collection call.
#[derive(Debug, Clone)]
pub enum CollectionOperation {
    /// Insert one record.
    InsertOne(Record),
    /// Insert a non-empty batch.
    InsertMany(Vec<Record>),
    /// Update all matches.
    Update {
        /// Which records.
        filter: Filter,
        /// How they change.
        update: Update,
    },
    /// Update the first match.
    UpdateOne {
        /// Which record.
        filter: Filter,
        /// How it changes.
        update: Update,
    },
    /// Delete all matches.
    Delete(Filter),
    /// Delete the first match.
    DeleteOne(Filter),
}

/// Strategy for generating collection operations.
pub fn collection_operation_strategy() -> impl Strategy<Value = CollectionOperation> {
    prop_oneof![
        3 => narrow_record_strategy().prop_map(CollectionOperation::InsertOne),
        1 => prop::collection::vec(narrow_record_strategy(), 1..4)
            .prop_map(CollectionOperation::InsertMany),
        2 => (filter_strategy(), update_strategy())
            .prop_map(|(filter, update)| CollectionOperation::Update { filter, update }),
        1 => (filter_strategy(), update_strategy())
            .prop_map(|(filter, update)| CollectionOperation::UpdateOne { filter, update }),
        1 => filter_strategy().prop_map(CollectionOperation::Delete),
        1 => filter_strategy().prop_map(CollectionOperation::DeleteOne),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<CollectionOperation>> {
    prop::collection::vec(collection_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
