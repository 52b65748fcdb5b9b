//! core::datastore
//!
//! Ordered key-value storage for repository namespaces.
//!
//! # Architecture
//!
//! Storage goes through the [`Datastore`] trait, which has two
//! implementations:
//!
//! - [`FsDatastore`]: a namespace directory inside a repository (default)
//! - [`MemoryDatastore`]: an ephemeral in-memory map
//!
//! Namespaces are opened from a locked repository via
//! [`crate::core::repo::LockedRepo::datastore`]; nothing else should
//! construct an `FsDatastore` for a live repository.

pub mod fs_store;
pub mod key;
pub mod memory;
pub mod traits;

pub use fs_store::FsDatastore;
pub use key::Key;
pub use memory::MemoryDatastore;
pub use traits::{Datastore, DatastoreError};
