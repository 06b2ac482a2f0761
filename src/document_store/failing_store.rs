//! Test double whose writes fail on chosen collections.

use super::{Collection, DocumentStore, Increment, MemoryDocumentStore};
use anyhow::{bail, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;

/// Reads always go to an in-memory store; writes to a collection marked with
/// `fail_writes` return an error and change nothing.
#[derive(Default)]
pub(crate) struct FailingDocumentStore {
    inner: MemoryDocumentStore,
    failing: Mutex<HashSet<Collection>>,
}

impl FailingDocumentStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_writes(&self, collection: Collection) {
        self.failing.lock().unwrap().insert(collection);
    }

    pub(crate) fn heal(&self, collection: Collection) {
        self.failing.lock().unwrap().remove(&collection);
    }

    fn check_write(&self, collection: Collection) -> Result<()> {
        if self.failing.lock().unwrap().contains(&collection) {
            bail!("Disk I/O error writing {}", collection);
        }
        Ok(())
    }
}

impl DocumentStore for FailingDocumentStore {
    fn get(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        self.inner.get(collection, key)
    }

    fn find_one(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Option<(String, Value)>> {
        self.inner.find_one(collection, field, value)
    }

    fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        self.inner.list(collection)
    }

    fn count(&self, collection: Collection) -> Result<usize> {
        self.inner.count(collection)
    }

    fn put(&self, collection: Collection, key: &str, record: &Value) -> Result<()> {
        self.check_write(collection)?;
        self.inner.put(collection, key, record)
    }

    fn insert(&self, collection: Collection, key: &str, record: &Value) -> Result<bool> {
        self.check_write(collection)?;
        self.inner.insert(collection, key, record)
    }

    fn atomic_increment(
        &self,
        collection: Collection,
        key: &str,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>> {
        self.check_write(collection)?;
        self.inner.atomic_increment(collection, key, field, delta)
    }

    fn increment_or_insert(
        &self,
        collection: Collection,
        increments: &[Increment<'_>],
    ) -> Result<Vec<i64>> {
        self.check_write(collection)?;
        self.inner.increment_or_insert(collection, increments)
    }
}
