//! In-memory document store.
//!
//! Same semantics as the SQLite store, nothing survives the process. Used by
//! tests and by the CLI when no database path is configured.

use super::{seeded_record, validate_field_name, Collection, DocumentStore, Increment};
use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default, Clone)]
struct MemoryCollection {
    order: Vec<String>,
    records: HashMap<String, Value>,
}

impl MemoryCollection {
    fn upsert(&mut self, key: &str, record: Value) {
        if self.records.insert(key.to_string(), record).is_none() {
            self.order.push(key.to_string());
        }
    }

    fn increment(&mut self, key: &str, field: &str, delta: i64) -> Result<Option<i64>> {
        let Some(record) = self.records.get_mut(key) else {
            return Ok(None);
        };
        let Some(object) = record.as_object_mut() else {
            bail!("Record {} is not a JSON object", key);
        };
        let current = match object.get(field) {
            None | Some(Value::Null) => 0,
            Some(value) => value
                .as_i64()
                .ok_or_else(|| anyhow!("Field {} of {} is not an integer", field, key))?,
        };
        let updated = current + delta;
        object.insert(field.to_string(), Value::from(updated));
        Ok(Some(updated))
    }
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<Collection, MemoryCollection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collections(&self) -> Result<MutexGuard<'_, HashMap<Collection, MemoryCollection>>> {
        self.collections
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        Ok(self
            .collections()?
            .get(&collection)
            .and_then(|c| c.records.get(key).cloned()))
    }

    fn find_one(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<(String, Value)>> {
        validate_field_name(field)?;
        let collections = self.collections()?;
        let Some(c) = collections.get(&collection) else {
            return Ok(None);
        };
        Ok(c.order.iter().find_map(|key| {
            let record = &c.records[key];
            (record.get(field) == Some(value)).then(|| (key.clone(), record.clone()))
        }))
    }

    fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        Ok(self
            .collections()?
            .get(&collection)
            .map(|c| c.order.iter().map(|key| c.records[key].clone()).collect())
            .unwrap_or_default())
    }

    fn count(&self, collection: Collection) -> Result<usize> {
        Ok(self
            .collections()?
            .get(&collection)
            .map_or(0, |c| c.records.len()))
    }

    fn put(&self, collection: Collection, key: &str, record: &Value) -> Result<()> {
        self.collections()?
            .entry(collection)
            .or_default()
            .upsert(key, record.clone());
        Ok(())
    }

    fn insert(&self, collection: Collection, key: &str, record: &Value) -> Result<bool> {
        let mut collections = self.collections()?;
        let c = collections.entry(collection).or_default();
        if c.records.contains_key(key) {
            return Ok(false);
        }
        c.upsert(key, record.clone());
        Ok(true)
    }

    fn atomic_increment(
        &self,
        collection: Collection,
        key: &str,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>> {
        validate_field_name(field)?;
        match self.collections()?.get_mut(&collection) {
            Some(c) => c.increment(key, field, delta),
            None => Ok(None),
        }
    }

    fn increment_or_insert(
        &self,
        collection: Collection,
        increments: &[Increment<'_>],
    ) -> Result<Vec<i64>> {
        let mut collections = self.collections()?;
        // Work on a copy and swap it in at the end, so a failing step leaves
        // the collection as it was.
        let mut working = collections.get(&collection).cloned().unwrap_or_default();
        let mut values = Vec::with_capacity(increments.len());
        for inc in increments {
            validate_field_name(inc.field)?;
            let value = match working.increment(inc.key, inc.field, inc.delta)? {
                Some(value) => value,
                None => {
                    working.upsert(inc.key, seeded_record(inc.seed, inc.field, inc.delta)?);
                    inc.delta
                }
            };
            values.push(value);
        }
        collections.insert(collection, working);
        Ok(values)
    }
}
