//! Collection store: CRUD over one persisted record set.

use crate::error::{CoreError, CoreResult};
use crate::id::{IdGenerator, ID_FIELD};
use crate::query::{Filter, Update};
use moonlight_codec::{from_json, to_json, Record, Value};
use moonlight_storage::{InMemoryBackend, StorageBackend, StorageError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A handle to one collection.
///
/// The collection's records live in a single persisted unit. Every call
/// reads the full record set, works on it in memory and, for mutating
/// calls, writes the full set back before returning. Nothing is cached
/// between calls, so [`Collection::count`] and friends always reflect
/// what is persisted.
///
/// Handles are cheap to clone. All handles for the same collection obtained
/// from one [`Database`](crate::Database) share a lock, so each call is
/// serialized against every other call on that collection.
///
/// # Example
///
/// ```rust,ignore
/// use moonlight_core::{Database, Filter, Update};
/// use moonlight_codec::Record;
///
/// let users = db.create_collection("users")?;
/// users.insert_one(Record::new().with("name", "user_123").with("xp", "99999"))?;
///
/// let found = users.find_one(&Filter::eq("name", "user_123"))?;
/// users.update_one(
///     &Filter::eq("name", "user_123"),
///     &Update::set(Record::new().with("xp", "0")),
/// )?;
/// ```
#[derive(Clone)]
pub struct Collection {
    /// Collection name.
    name: String,
    /// Backing unit.
    backend: Arc<dyn StorageBackend>,
    /// Serializes calls on this collection.
    lock: Arc<Mutex<()>>,
    /// Identifier source shared with the database.
    ids: Arc<IdGenerator>,
    /// Whether rewrites are pretty-printed.
    pretty: bool,
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}

impl Collection {
    pub(crate) fn new(
        name: String,
        backend: Arc<dyn StorageBackend>,
        lock: Arc<Mutex<()>>,
        ids: Arc<IdGenerator>,
        pretty: bool,
    ) -> Self {
        Self {
            name,
            backend,
            lock,
            ids,
            pretty,
        }
    }

    /// Creates a standalone collection over any backend.
    ///
    /// The handle gets its own lock and identifier source. Use
    /// [`Database::collection`](crate::Database::collection) for collections
    /// that belong to a database.
    pub fn with_backend(name: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        Self::new(
            name.into(),
            backend,
            Arc::new(Mutex::new(())),
            Arc::new(IdGenerator::from_entropy()),
            false,
        )
    }

    /// Creates an empty, non-persistent collection.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::with_backend(name, Arc::new(InMemoryBackend::with_data(b"[]".to_vec())))
    }

    /// Replaces the identifier source.
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current number of records.
    ///
    /// Recomputed from persisted state on every call.
    pub fn count(&self) -> CoreResult<usize> {
        let _guard = self.lock.lock();
        Ok(self.load()?.len())
    }

    /// Returns every matching record in stored order.
    ///
    /// An empty collection yields an empty vector whatever the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if the collection has records but none
    /// match.
    pub fn find(&self, filter: &Filter) -> CoreResult<Vec<Record>> {
        let _guard = self.lock.lock();
        let records = self.load()?;
        if records.is_empty() {
            return Ok(records);
        }

        let found: Vec<Record> = records.into_iter().filter(|r| filter.matches(r)).collect();
        debug!(collection = %self.name, matched = found.len(), "find");
        if found.is_empty() {
            return Err(CoreError::record_not_found(&self.name));
        }
        Ok(found)
    }

    /// Returns every record.
    pub fn find_all(&self) -> CoreResult<Vec<Record>> {
        self.find(&Filter::all())
    }

    /// Returns the first matching record.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if nothing matches.
    pub fn find_one(&self, filter: &Filter) -> CoreResult<Record> {
        let _guard = self.lock.lock();
        self.load()?
            .into_iter()
            .find(|r| filter.matches(r))
            .ok_or_else(|| CoreError::record_not_found(&self.name))
    }

    /// Inserts one record and returns its `_id`.
    ///
    /// A record that already carries an `_id` keeps its value; otherwise a
    /// fresh identifier is generated. Either way `_id` is stored first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the record has no fields or holds a
    /// NaN or infinite number.
    pub fn insert_one(&self, record: Record) -> CoreResult<Value> {
        if record.is_empty() {
            return Err(CoreError::invalid_argument("cannot insert an empty record"));
        }
        ensure_storable(&record)?;

        let (record, id) = self.assign_id(record);
        let _guard = self.lock.lock();
        let mut records = self.load()?;
        records.push(record);
        self.persist(&records)?;

        debug!(collection = %self.name, total = records.len(), "insert_one");
        Ok(id)
    }

    /// Inserts records in input order and returns their `_id`s.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `records` is empty or any record holds
    /// a NaN or infinite number. Nothing is written in that case.
    pub fn insert_many(&self, records: Vec<Record>) -> CoreResult<Vec<Value>> {
        if records.is_empty() {
            return Err(CoreError::invalid_argument("cannot insert an empty list"));
        }
        records.iter().try_for_each(ensure_storable)?;

        let (prepared, ids): (Vec<Record>, Vec<Value>) =
            records.into_iter().map(|r| self.assign_id(r)).unzip();

        let _guard = self.lock.lock();
        let mut stored = self.load()?;
        stored.extend(prepared);
        self.persist(&stored)?;

        debug!(collection = %self.name, inserted = ids.len(), "insert_many");
        Ok(ids)
    }

    /// Applies `update` to every matching record and returns how many
    /// matched.
    ///
    /// The full record set is written back even when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument`, before reading anything, if the update
    /// writes a NaN or infinite number.
    pub fn update(&self, filter: &Filter, update: &Update) -> CoreResult<usize> {
        ensure_update_storable(update)?;
        let _guard = self.lock.lock();
        let mut records = self.load()?;

        let mut matched = 0;
        for record in records.iter_mut().filter(|r| filter.matches(r)) {
            update.apply(record);
            matched += 1;
        }
        self.persist(&records)?;

        debug!(collection = %self.name, matched, "update");
        Ok(matched)
    }

    /// Parses an update document such as `{"$set": {...}}` and applies it
    /// to every matching record.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for any verb other than `$set`; the
    /// collection is not touched in that case.
    pub fn update_with(&self, filter: &Filter, document: &Record) -> CoreResult<usize> {
        let update = Update::parse(document)?;
        self.update(filter, &update)
    }

    /// Applies `update` to the first matching record and returns the
    /// record as stored.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if nothing matches, or `InvalidArgument`
    /// if the update writes a NaN or infinite number.
    pub fn update_one(&self, filter: &Filter, update: &Update) -> CoreResult<Record> {
        ensure_update_storable(update)?;
        let _guard = self.lock.lock();
        let mut records = self.load()?;

        let record = records
            .iter_mut()
            .find(|r| filter.matches(r))
            .ok_or_else(|| CoreError::record_not_found(&self.name))?;
        update.apply(record);
        let updated = record.clone();
        self.persist(&records)?;

        debug!(collection = %self.name, "update_one");
        Ok(updated)
    }

    /// Parses an update document and applies it to the first match.
    ///
    /// The verb is checked before any record is read.
    pub fn update_one_with(&self, filter: &Filter, document: &Record) -> CoreResult<Record> {
        let update = Update::parse(document)?;
        self.update_one(filter, &update)
    }

    /// Removes every matching record and returns how many were removed.
    ///
    /// Zero matches is not an error; the unchanged set is written back.
    pub fn delete(&self, filter: &Filter) -> CoreResult<usize> {
        let _guard = self.lock.lock();
        let mut records = self.load()?;

        let before = records.len();
        records.retain(|r| !filter.matches(r));
        let removed = before - records.len();
        self.persist(&records)?;

        debug!(collection = %self.name, removed, "delete");
        Ok(removed)
    }

    /// Removes the first matching record and returns it.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if nothing matches.
    pub fn delete_one(&self, filter: &Filter) -> CoreResult<Record> {
        let _guard = self.lock.lock();
        let mut records = self.load()?;

        let idx = records
            .iter()
            .position(|r| filter.matches(r))
            .ok_or_else(|| CoreError::record_not_found(&self.name))?;
        let removed = records.remove(idx);
        self.persist(&records)?;

        debug!(collection = %self.name, index = idx, "delete_one");
        Ok(removed)
    }

    /// Gives `record` an identifier unless it already has one, and moves
    /// `_id` to the front.
    fn assign_id(&self, mut record: Record) -> (Record, Value) {
        let id = match record.get(ID_FIELD) {
            Some(existing) => existing.clone(),
            None => Value::Text(self.ids.next_id()),
        };
        record.insert_first(ID_FIELD, id.clone());
        (record, id)
    }

    /// Reads and decodes the full record set.
    fn load(&self) -> CoreResult<Vec<Record>> {
        let bytes = self.backend.read_all().map_err(|e| match e {
            StorageError::NotFound { .. } => CoreError::collection_not_found(&self.name),
            other => CoreError::Storage(other),
        })?;

        from_json(&bytes).map_err(|e| {
            warn!("collection {} could not be decoded: {}", self.name, e);
            CoreError::corrupt_store(&self.name, e.to_string())
        })
    }

    /// Encodes and writes the full record set.
    fn persist(&self, records: &[Record]) -> CoreResult<()> {
        let bytes = to_json(records, self.pretty)?;
        self.backend.replace(&bytes)?;
        Ok(())
    }
}

fn ensure_storable(record: &Record) -> CoreResult<()> {
    if record.is_storable() {
        Ok(())
    } else {
        Err(CoreError::invalid_argument("NaN and infinite numbers cannot be stored"))
    }
}

fn ensure_update_storable(update: &Update) -> CoreResult<()> {
    if update.is_storable() {
        Ok(())
    } else {
        Err(CoreError::invalid_argument("NaN and infinite numbers cannot be stored"))
    }
}
