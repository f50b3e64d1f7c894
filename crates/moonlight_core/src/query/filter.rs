//! Exact-match record filters.

use moonlight_codec::{Record, Value};

/// A conjunction of field equality clauses.
///
/// A record matches when every clause's field is present in the record
/// with a deeply equal value. There are no operators: no ranges, no
/// patterns, no alternatives. The empty filter matches every record.
///
/// # Example
///
/// ```rust
/// use moonlight_codec::Record;
/// use moonlight_core::Filter;
///
/// let record = Record::new().with("name", "Alice").with("xp", 10);
///
/// assert!(Filter::all().matches(&record));
/// assert!(Filter::eq("xp", 10).matches(&record));
/// assert!(!Filter::eq("xp", "10").matches(&record));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Record,
}

impl Filter {
    /// The match-all filter.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter with a single clause.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Adds a clause. A repeated field replaces the earlier clause.
    #[must_use]
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.insert(field, value);
        self
    }

    /// Returns true if this filter matches every record.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Iterates over the clauses.
    pub fn clauses(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.clauses.iter()
    }

    /// Evaluates this filter against `record`.
    pub fn matches(&self, record: &Record) -> bool {
        matches(record, self)
    }
}

impl From<Record> for Filter {
    fn from(clauses: Record) -> Self {
        Self { clauses }
    }
}

/// Returns true if `record` satisfies every clause of `filter`.
pub fn matches(record: &Record, filter: &Filter) -> bool {
    filter
        .clauses
        .iter()
        .all(|(field, expected)| record.get(field).is_some_and(|actual| actual == expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Update;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(json: serde_json::Value) -> Record {
        Record::try_from(json).unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::all().matches(&Record::new()));
        assert!(Filter::all().matches(&record(json!({"a": 1}))));
        assert!(Filter::from(Record::new()).is_empty());
    }

    #[test]
    fn all_clauses_must_hold() {
        let r = record(json!({"id": "1234567890", "xp": "99999", "lvl": 3}));

        assert!(Filter::eq("id", "1234567890").and("xp", "99999").matches(&r));
        assert!(!Filter::eq("id", "1234567890").and("xp", "0").matches(&r));
        assert!(!Filter::eq("missing", 1).matches(&r));
    }

    #[test]
    fn equality_is_strict() {
        let r = record(json!({"n": 1, "s": "1", "b": true}));

        assert!(Filter::eq("n", 1).matches(&r));
        assert!(Filter::eq("n", 1.0).matches(&r));
        assert!(!Filter::eq("n", "1").matches(&r));
        assert!(!Filter::eq("s", 1).matches(&r));
        assert!(!Filter::eq("b", 1).matches(&r));
    }

    #[test]
    fn null_clause_needs_present_field() {
        let with_null = record(json!({"x": null}));
        let without = record(json!({"y": 1}));

        assert!(Filter::eq("x", ()).matches(&with_null));
        assert!(!Filter::eq("x", ()).matches(&without));
    }

    #[test]
    fn nested_values_match_deeply() {
        let r = record(json!({"tags": ["a", "b"], "meta": {"k": 1}}));

        assert!(Filter::eq("tags", vec!["a", "b"]).matches(&r));
        assert!(!Filter::eq("tags", vec!["b", "a"]).matches(&r));
        assert!(Filter::eq("meta", Record::new().with("k", 1)).matches(&r));
    }

    #[test]
    fn repeated_field_replaces_clause() {
        let filter = Filter::eq("a", 1).and("a", 2);
        assert_eq!(filter.len(), 1);
        assert!(filter.matches(&record(json!({"a": 2}))));
    }

    fn value_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-50i64..50).prop_map(Value::Integer),
            (-1.0e6f64..1.0e6).prop_map(Value::Float),
            "[a-z]{0,6}".prop_map(Value::Text),
        ]
    }

    /// Records over the fields `a` to `e`.
    fn record_strategy() -> impl Strategy<Value = Record> {
        prop::collection::vec(("[a-e]", value_strategy()), 0..8).prop_map(|fields| {
            fields
                .into_iter()
                .fold(Record::new(), |record, (field, value)| record.with(field, value))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn record_matches_any_subset_of_its_fields(
            target in record_strategy(),
            keep in prop::collection::vec(any::<bool>(), 5),
        ) {
            let subset = target
                .iter()
                .zip(&keep)
                .filter(|(_, keep)| **keep)
                .fold(Record::new(), |clauses, ((field, value), _)| clauses.with(field, value.clone()));

            prop_assert!(Filter::from(subset).matches(&target));
        }

        #[test]
        fn absent_field_never_matches(target in record_strategy(), value in value_strategy()) {
            prop_assert!(!Filter::eq("z", value).matches(&target));
        }

        #[test]
        fn set_makes_patch_match_and_is_idempotent(
            mut target in record_strategy(),
            patch in record_strategy(),
        ) {
            let update = Update::set(patch.clone());
            update.apply(&mut target);
            prop_assert!(Filter::from(patch).matches(&target));

            let once = target.clone();
            update.apply(&mut target);
            prop_assert_eq!(target, once);
        }
    }
}
