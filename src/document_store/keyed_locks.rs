use super::Collection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-record mutual exclusion for read-modify-write sequences.
///
/// Every caller that reads a record, changes it and writes it back goes
/// through `run` with the same `(collection, key)`, so two such sequences on
/// one record never interleave. Sequences on different records run in
/// parallel. An entry is dropped as soon as nobody holds or waits for it.
#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_key(collection: Collection, key: &str) -> String {
        format!("{}/{}", collection, key)
    }

    fn acquire_entry(&self, lock_key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(lock_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release_entry(&self, lock_key: &str, entry: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference lives in the map and one is ours; anything above that
        // is another caller holding or waiting.
        if Arc::strong_count(&entry) == 2 {
            locks.remove(lock_key);
        }
        // Released under the map lock so the next count is exact.
        drop(entry);
    }

    /// Runs `f` while holding the lock for `(collection, key)`.
    pub fn run<T>(&self, collection: Collection, key: &str, f: impl FnOnce() -> T) -> T {
        let lock_key = Self::lock_key(collection, key);
        let entry = self.acquire_entry(&lock_key);
        let result = {
            // The guarded value is `()`, so a panic in another holder leaves
            // nothing inconsistent behind.
            let _guard = entry.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release_entry(&lock_key, entry);
        result
    }

    /// Number of keys currently held or waited for.
    pub fn active_keys(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
