//! core::metadata::counter
//!
//! Durable, monotonically increasing sequence numbers.
//!
//! # Encoding
//!
//! The value is stored as exactly 8 bytes, unsigned big-endian. Reads of
//! any other length fail with [`CounterError::Decode`]; they are never
//! repaired automatically.
//!
//! # Invariants
//!
//! - `next` returns the stored value `v` (0 when absent) and persists `v + 1`
//! - without an intervening `overwrite`, values returned by `next` are
//!   consecutive and strictly increasing
//! - `next` never wraps: at `u64::MAX` it fails and writes nothing
//!
//! `next` is a read followed by a write. It is only safe while the
//! repository lock is held, which gives this process the only writer on
//! the namespace.
//!
//! # Example
//!
//! ```
//! use filminerctl::core::datastore::{Key, MemoryDatastore};
//! use filminerctl::core::metadata::counter::StoredCounter;
//!
//! let ds = MemoryDatastore::new();
//! let counter = StoredCounter::new(&ds, Key::new("/storage/nextid"));
//!
//! assert_eq!(counter.next().unwrap(), 0);
//! assert_eq!(counter.next().unwrap(), 1);
//! assert_eq!(counter.peek().unwrap(), Some(2));
//! ```

use std::fmt;

use thiserror::Error;

use crate::core::datastore::{Datastore, DatastoreError, Key};

/// Width of the stored encoding in bytes.
pub const COUNTER_LEN: usize = 8;

/// Errors from counter operations.
#[derive(Debug, Error)]
pub enum CounterError {
    /// The stored bytes are not an 8-byte big-endian integer.
    #[error("counter at {key} is corrupt: expected {} bytes, found {len}", COUNTER_LEN)]
    Decode { key: Key, len: usize },

    /// The counter reached `u64::MAX` and cannot advance.
    #[error("counter at {0} is exhausted")]
    Exhausted(Key),

    /// The datastore failed.
    #[error(transparent)]
    Datastore(#[from] DatastoreError),
}

/// A sector number handed out by the storage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectorNumber(pub u64);

impl fmt::Display for SectorNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode a counter value in the stored layout.
pub fn encode_counter(value: u64) -> [u8; COUNTER_LEN] {
    value.to_be_bytes()
}

/// Decode a counter value from the stored layout.
///
/// Returns `None` unless `bytes` is exactly [`COUNTER_LEN`] long.
pub fn decode_counter(bytes: &[u8]) -> Option<u64> {
    let raw: [u8; COUNTER_LEN] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

/// A counter bound to one key of a datastore.
pub struct StoredCounter<'a> {
    ds: &'a dyn Datastore,
    key: Key,
}

impl<'a> StoredCounter<'a> {
    /// Bind a counter to `key` in `ds`.
    pub fn new(ds: &'a dyn Datastore, key: Key) -> Self {
        Self { ds, key }
    }

    /// Get the key backing this counter.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Allocate the next value.
    ///
    /// Returns the current value (0 if the key is absent) and persists the
    /// value plus one.
    pub fn next(&self) -> Result<u64, CounterError> {
        let current = self.peek()?.unwrap_or(0);
        let following = current
            .checked_add(1)
            .ok_or_else(|| CounterError::Exhausted(self.key.clone()))?;

        self.ds.put(&self.key, &encode_counter(following))?;
        tracing::debug!(key = %self.key, allocated = current, stored = following, "counter advanced");
        Ok(current)
    }

    /// Allocate the next value as a sector number.
    pub fn next_sector(&self) -> Result<SectorNumber, CounterError> {
        self.next().map(SectorNumber)
    }

    /// Read the stored value without changing it.
    ///
    /// Returns `Ok(None)` if the key is absent.
    pub fn peek(&self) -> Result<Option<u64>, CounterError> {
        let bytes = match self.ds.get(&self.key) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        decode_counter(&bytes)
            .map(Some)
            .ok_or_else(|| CounterError::Decode {
                key: self.key.clone(),
                len: bytes.len(),
            })
    }

    /// Replace the stored value unconditionally.
    ///
    /// This skips the monotonicity guarantee. It exists for repairing a
    /// corrupt or lost counter and is only called by the `fix-counter`
    /// command.
    pub fn overwrite(&self, value: u64) -> Result<(), CounterError> {
        self.ds.put(&self.key, &encode_counter(value))?;
        tracing::info!(key = %self.key, value, "counter overwritten");
        Ok(())
    }
}
