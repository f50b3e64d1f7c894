//! Schema-less record type.

use crate::value::Value;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;

/// An insertion-ordered mapping from field name to [`Value`].
///
/// Field names are unique: inserting an existing name overwrites the value
/// in place and keeps the field's position. Equality ignores field order,
/// so two records are equal when they hold the same fields with deeply
/// equal values.
///
/// Field lookups scan the fields in order, which suits the small records a
/// collection holds. Decoding builds a temporary index, so wide records
/// still load in linear time.
///
/// # Example
///
/// ```
/// use moonlight_codec::{Record, Value};
///
/// let record = Record::new().with("name", "Alice").with("age", 30);
/// assert_eq!(record.get("age"), Some(&Value::Integer(30)));
/// assert_eq!(record.keys().collect::<Vec<_>>(), ["name", "age"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record with room for `capacity` fields.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|(k, _)| k == key)
    }

    /// Looks up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Looks up a field for modification.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns true if the field is present (even when it holds null).
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Sets a field, returning the previous value if there was one.
    ///
    /// New fields are appended; existing fields keep their position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.fields[idx].1, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    /// Sets a field and moves it to the front of the record.
    pub fn insert_first(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let previous = self.remove(&key);
        self.fields.insert(0, (key, value.into()));
        previous
    }

    /// Removes a field, preserving the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.position(key).map(|idx| self.fields.remove(idx).1)
    }

    /// Shallow merge: every field of `patch` overwrites or extends `self`.
    pub fn merge(&mut self, patch: &Record) {
        for (key, value) in &patch.fields {
            self.insert(key.clone(), value.clone());
        }
    }

    /// Returns true if every field value can be written to JSON.
    #[must_use]
    pub fn is_storable(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_storable())
    }

    /// Iterates over fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Builds a record from a decoder's map, in one pass.
    ///
    /// Duplicate keys keep the position of their first occurrence and the
    /// value of their last.
    pub(crate) fn from_map_access<'de, A: MapAccess<'de>>(mut map: A) -> Result<Self, A::Error> {
        let capacity = map.size_hint().unwrap_or(0);
        let mut fields: Vec<(String, Value)> = Vec::with_capacity(capacity);
        let mut index: HashMap<String, usize> = HashMap::with_capacity(capacity);

        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            match index.get(&key) {
                Some(&idx) => fields[idx].1 = value,
                None => {
                    index.insert(key.clone(), fields.len());
                    fields.push((key, value));
                }
            }
        }
        Ok(Self { fields })
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .fields
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.deep_eq(o)))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = crate::CodecError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match Value::from(json) {
            Value::Object(record) => Ok(record),
            other => Err(crate::CodecError::invalid_structure(format!(
                "expected an object, found {}",
                other.kind_name()
            ))),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Record, A::Error> {
        Record::from_map_access(map)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}
