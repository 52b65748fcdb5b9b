//! core::ops
//!
//! Repository locking.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive repository lock
//!
//! # Architecture
//!
//! Every command that touches the datastore:
//! 1. Acquires the exclusive repo lock
//! 2. Opens the namespaces it needs
//! 3. Releases the lock (explicitly, or on drop along error paths)

pub mod lock;

pub use lock::{LockError, LockKind, RepoLock};
