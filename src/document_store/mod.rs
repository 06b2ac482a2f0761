//! JSON document storage addressed by `(collection, key)`.
//!
//! Everything above this layer talks to a `DocumentStore`; which engine sits
//! behind it (SQLite on disk, or plain maps for tests and throwaway runs) is
//! decided once at startup.

#[cfg(test)]
pub(crate) mod failing_store;
mod keyed_locks;
mod memory_store;
mod schema;
mod sqlite_document_store;

pub use keyed_locks::KeyedLocks;
pub use memory_store::MemoryDocumentStore;
pub use schema::DOCUMENT_VERSIONED_SCHEMAS;
pub use sqlite_document_store::SqliteDocumentStore;

use anyhow::{bail, Result};
use serde_json::Value;
use std::fmt;

/// The record families kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Parties,
    Albums,
    Counters,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Parties => "parties",
            Collection::Albums => "albums",
            Collection::Counters => "counters",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of `DocumentStore::increment_or_insert`.
///
/// When `key` is absent, `seed` is stored with `field` set to `delta`.
/// Otherwise `delta` is added to the stored `field` and the rest of the
/// stored record is left untouched.
#[derive(Debug, Clone, Copy)]
pub struct Increment<'a> {
    pub key: &'a str,
    pub field: &'a str,
    pub delta: i64,
    pub seed: &'a Value,
}

pub trait DocumentStore: Send + Sync {
    /// Returns the record stored under `key`.
    /// Returns Ok(None) if there is no such record.
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>>;

    /// Returns the first record (in insertion order) whose top level `field`
    /// equals `value`, together with its key.
    fn find_one(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<(String, Value)>>;

    /// Returns every record of the collection in insertion order.
    fn list(&self, collection: Collection) -> Result<Vec<Value>>;

    /// Returns the number of records in the collection.
    fn count(&self, collection: Collection) -> Result<usize>;

    /// Stores `record` under `key`, replacing any previous record in a single
    /// step. A replaced record keeps its original insertion position.
    fn put(&self, collection: Collection, key: &str, record: &Value) -> Result<()>;

    /// Stores `record` only if `key` is absent.
    /// Returns whether the record was inserted.
    fn insert(&self, collection: Collection, key: &str, record: &Value) -> Result<bool>;

    /// Adds `delta` to the integer `field` of an existing record (a missing
    /// field counts as 0) and returns the new value.
    /// Returns Ok(None) if there is no record under `key`.
    fn atomic_increment(
        &self,
        collection: Collection,
        key: &str,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>>;

    /// Applies every increment in order as one atomic batch and returns the
    /// resulting field values. Either the whole batch is applied or nothing is.
    fn increment_or_insert(
        &self,
        collection: Collection,
        increments: &[Increment<'_>],
    ) -> Result<Vec<i64>>;
}

/// Field names end up in JSON paths, so only plain identifiers are accepted.
pub(crate) fn validate_field_name(field: &str) -> Result<()> {
    if field.is_empty()
        || !field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        bail!("Invalid document field name {:?}", field);
    }
    Ok(())
}

/// The record `increment_or_insert` stores for an absent key.
pub(crate) fn seeded_record(seed: &Value, field: &str, delta: i64) -> Result<Value> {
    let mut record = seed.clone();
    match record.as_object_mut() {
        Some(object) => {
            object.insert(field.to_string(), Value::from(delta));
        }
        None => bail!("Increment seed must be a JSON object, got {}", seed),
    }
    Ok(record)
}
