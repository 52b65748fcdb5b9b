//! core::datastore::memory
//!
//! In-memory datastore.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::traits::{ensure_value_key, Datastore, DatastoreError};
use super::Key;

/// A `BTreeMap`-backed datastore.
///
/// Nothing is persisted. Useful for tests and for exercising counter and
/// address logic without a repository on disk.
#[derive(Debug, Default)]
pub struct MemoryDatastore {
    entries: RwLock<BTreeMap<Key, Vec<u8>>>,
}

impl MemoryDatastore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys holding a value.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Datastore for MemoryDatastore {
    fn get(&self, key: &Key) -> Result<Vec<u8>, DatastoreError> {
        let entries = self.entries.read().map_err(|_| DatastoreError::Poisoned)?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| DatastoreError::NotFound(key.clone()))
    }

    fn put(&self, key: &Key, value: &[u8]) -> Result<(), DatastoreError> {
        ensure_value_key(key)?;
        let mut entries = self.entries.write().map_err(|_| DatastoreError::Poisoned)?;
        entries.insert(key.clone(), value.to_vec());
        Ok(())
    }

    fn has(&self, key: &Key) -> Result<bool, DatastoreError> {
        let entries = self.entries.read().map_err(|_| DatastoreError::Poisoned)?;
        Ok(entries.contains_key(key))
    }

    fn delete(&self, key: &Key) -> Result<(), DatastoreError> {
        let mut entries = self.entries.write().map_err(|_| DatastoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<Key>, DatastoreError> {
        let entries = self.entries.read().map_err(|_| DatastoreError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}
