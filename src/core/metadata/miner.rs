//! core::metadata::miner
//!
//! The miner address record.
//!
//! One key of the metadata namespace holds the binary-encoded address of
//! the miner actor. Writes always go through [`Address`], so the stored
//! bytes decode by construction.

use thiserror::Error;

use crate::core::address::{Address, AddressError, Network};
use crate::core::datastore::{Datastore, DatastoreError, Key};

/// Errors from miner address record operations.
#[derive(Debug, Error)]
pub enum MinerRecordError {
    /// No address is stored.
    #[error("miner address not found at {0}")]
    NotFound(Key),

    /// The stored bytes do not decode as an address.
    #[error("stored miner address is corrupt: {0}")]
    Decode(#[source] AddressError),

    /// The supplied address string does not parse.
    #[error("invalid address '{input}': {source}")]
    InvalidAddress {
        input: String,
        #[source]
        source: AddressError,
    },

    /// The datastore failed.
    #[error(transparent)]
    Datastore(DatastoreError),
}

impl From<DatastoreError> for MinerRecordError {
    fn from(e: DatastoreError) -> Self {
        match e {
            DatastoreError::NotFound(key) => MinerRecordError::NotFound(key),
            other => MinerRecordError::Datastore(other),
        }
    }
}

/// Parse a user-supplied address string.
///
/// Returns the network the string was written for alongside the address.
pub fn parse_address(input: &str) -> Result<(Network, Address), MinerRecordError> {
    Address::parse_with_network(input).map_err(|source| MinerRecordError::InvalidAddress {
        input: input.to_string(),
        source,
    })
}

/// The miner address bound to one key of a datastore.
pub struct MinerAddressRecord<'a> {
    ds: &'a dyn Datastore,
    key: Key,
}

impl<'a> MinerAddressRecord<'a> {
    /// Bind the record to `key` in `ds`.
    pub fn new(ds: &'a dyn Datastore, key: Key) -> Self {
        Self { ds, key }
    }

    /// Get the key backing this record.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Read and decode the stored address.
    pub fn get(&self) -> Result<Address, MinerRecordError> {
        let bytes = self.ds.get(&self.key)?;
        Address::from_bytes(&bytes).map_err(MinerRecordError::Decode)
    }

    /// Get the raw stored bytes, if any.
    pub fn raw(&self) -> Result<Option<Vec<u8>>, MinerRecordError> {
        match self.ds.get(&self.key) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(DatastoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `address`, replacing whatever is stored.
    pub fn set(&self, address: &Address) -> Result<(), MinerRecordError> {
        self.ds.put(&self.key, &address.to_bytes())?;
        tracing::info!(key = %self.key, address = %address, "miner address written");
        Ok(())
    }

    /// Parse `input` and persist it.
    ///
    /// The store is untouched when parsing fails.
    pub fn set_str(&self, input: &str) -> Result<Address, MinerRecordError> {
        let (_, address) = parse_address(input)?;
        self.set(&address)?;
        Ok(address)
    }
}
