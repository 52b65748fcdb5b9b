//! core::metadata
//!
//! Records kept in the repository's metadata namespace.
//!
//! # Modules
//!
//! - [`counter`] - The stored sector-number counter
//! - [`miner`] - The miner address record
//!
//! # Layout
//!
//! Both records live in the `/metadata` namespace:
//! - `/storage/nextid` - 8-byte big-endian next sector number
//! - `/miner-address` - binary-encoded miner actor address

pub mod counter;
pub mod miner;

pub use counter::{decode_counter, encode_counter, CounterError, SectorNumber, StoredCounter};
pub use miner::{parse_address, MinerAddressRecord, MinerRecordError};

use crate::core::datastore::Key;

/// Namespace prefix holding the metadata records.
pub const METADATA_NAMESPACE: &str = "/metadata";

/// Key of the sector-number counter.
pub const STORAGE_COUNTER_KEY: &str = "/storage/nextid";

/// Key of the miner address record.
pub const MINER_ADDRESS_KEY: &str = "/miner-address";

/// Key of the sector-number counter.
pub fn storage_counter_key() -> Key {
    Key::new(STORAGE_COUNTER_KEY)
}

/// Key of the miner address record.
pub fn miner_address_key() -> Key {
    Key::new(MINER_ADDRESS_KEY)
}
