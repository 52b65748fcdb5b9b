//! core::datastore::traits
//!
//! Datastore trait definition.
//!
//! # Design
//!
//! The `Datastore` trait is a small ordered key-value interface: values
//! are opaque bytes, keys are cleaned [`Key`] paths. A namespace opened
//! from a locked repository is a `Datastore`; so is the in-memory store
//! used by tests.
//!
//! # Concurrency
//!
//! Implementations are `Send + Sync` but do not provide read-modify-write
//! atomicity. Callers that need it (the stored counter) rely on the
//! repository lock for single-writer access.

use thiserror::Error;

use super::Key;

/// Errors from datastore operations.
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// The key holds no value.
    #[error("key not found: {0}")]
    NotFound(Key),

    /// The key cannot hold a value (the root key, or an invalid namespace).
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Failed to read from the backing storage.
    #[error("failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to the backing storage.
    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("datastore lock poisoned")]
    Poisoned,
}

impl DatastoreError {
    /// Check whether this error means the key is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatastoreError::NotFound(_))
    }
}

/// Trait for ordered key-value stores.
///
/// # Example
///
/// ```
/// use filminerctl::core::datastore::{Datastore, Key, MemoryDatastore};
///
/// let ds = MemoryDatastore::new();
/// let key = Key::new("miner-address");
///
/// assert!(!ds.has(&key).unwrap());
/// ds.put(&key, b"\x00\x80\x08").unwrap();
/// assert_eq!(ds.get(&key).unwrap(), b"\x00\x80\x08");
/// ```
pub trait Datastore: Send + Sync {
    /// Get the value stored under `key`.
    ///
    /// Returns `Err(DatastoreError::NotFound)` if the key holds no value.
    fn get(&self, key: &Key) -> Result<Vec<u8>, DatastoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &Key, value: &[u8]) -> Result<(), DatastoreError>;

    /// Check whether `key` holds a value.
    fn has(&self, key: &Key) -> Result<bool, DatastoreError>;

    /// Remove the value under `key`.
    ///
    /// Removing an absent key is not an error.
    fn delete(&self, key: &Key) -> Result<(), DatastoreError>;

    /// List every key holding a value, in ascending order.
    fn keys(&self) -> Result<Vec<Key>, DatastoreError>;
}

/// Reject keys that cannot hold a value.
pub(crate) fn ensure_value_key(key: &Key) -> Result<(), DatastoreError> {
    if key.is_root() {
        return Err(DatastoreError::InvalidKey(
            "the root key cannot hold a value".into(),
        ));
    }
    Ok(())
}
