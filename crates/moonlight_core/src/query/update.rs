//! Update specifications.

use crate::error::{CoreError, CoreResult};
use moonlight_codec::{Record, Value};

/// The only recognized update operation.
pub const SET_OPERATION: &str = "$set";

/// How matched records change.
///
/// Build one directly with [`Update::set`], or parse an update document of
/// the form `{ "$set": { field: value, ... } }` with [`Update::parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Shallow overwrite of the listed fields; other fields are untouched.
    Set(Record),
}

impl Update {
    /// Creates a `$set` update.
    #[must_use]
    pub fn set(patch: Record) -> Self {
        Self::Set(patch)
    }

    /// Parses an update document.
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperation` unless the document has exactly one key and
    ///   that key is `$set`
    /// - `InvalidArgument` if the `$set` value is not an object
    pub fn parse(document: &Record) -> CoreResult<Self> {
        let mut keys = document.keys();
        let operation = match (keys.next(), keys.next()) {
            (Some(op), None) => op,
            (None, _) => return Err(CoreError::unsupported_operation("<empty update>")),
            (Some(_), Some(_)) => {
                let all: Vec<&str> = document.keys().collect();
                return Err(CoreError::unsupported_operation(all.join(",")));
            }
        };

        if operation != SET_OPERATION {
            return Err(CoreError::unsupported_operation(operation));
        }

        match document.get(SET_OPERATION) {
            Some(Value::Object(patch)) => Ok(Self::Set(patch.clone())),
            Some(other) => Err(CoreError::invalid_argument(format!(
                "{SET_OPERATION} expects an object, found {}",
                other.kind_name()
            ))),
            None => Err(CoreError::unsupported_operation(operation)),
        }
    }

    /// Returns true if every value this update writes can be persisted.
    pub fn is_storable(&self) -> bool {
        match self {
            Self::Set(patch) => patch.is_storable(),
        }
    }

    /// Applies this update to `record`.
    pub fn apply(&self, record: &mut Record) {
        match self {
            Self::Set(patch) => record.merge(patch),
        }
    }
}

impl TryFrom<&Record> for Update {
    type Error = CoreError;

    fn try_from(document: &Record) -> CoreResult<Self> {
        Self::parse(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn record(json: serde_json::Value) -> Record {
        Record::try_from(json).unwrap()
    }

    #[test]
    fn parse_set() {
        let update = Update::parse(&record(json!({"$set": {"xp": "0"}}))).unwrap();
        assert_eq!(update, Update::set(Record::new().with("xp", "0")));
    }

    #[test]
    fn parse_rejects_other_verbs() {
        let err = Update::parse(&record(json!({"$inc": {"a": 1}}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
        assert!(err.to_string().contains("$inc"));

        let err = Update::parse(&record(json!({"a": 1}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn parse_rejects_empty_and_mixed_documents() {
        let err = Update::parse(&Record::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);

        let err = Update::parse(&record(json!({"$set": {"a": 1}, "$unset": {"b": 1}}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn parse_requires_object_patch() {
        let err = Update::parse(&record(json!({"$set": 5}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn apply_overwrites_listed_fields_only() {
        let mut target = record(json!({"_id": "x", "a": 1, "b": 2}));
        Update::set(record(json!({"b": 9, "c": true}))).apply(&mut target);

        assert_eq!(target, record(json!({"_id": "x", "a": 1, "b": 9, "c": true})));
        assert_eq!(target.keys().collect::<Vec<_>>(), ["_id", "a", "b", "c"]);
    }

    #[test]
    fn apply_is_idempotent() {
        let update = Update::set(record(json!({"b": 9})));
        let mut once = record(json!({"a": 1}));
        update.apply(&mut once);
        let mut twice = once.clone();
        update.apply(&mut twice);

        assert_eq!(once, twice);
    }
}
