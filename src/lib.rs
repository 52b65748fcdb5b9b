//! filminerctl - repair tool for storage-miner repository metadata
//!
//! A storage miner keeps small administrative records in the `/metadata`
//! namespace of its repository datastore: the next sector number and the
//! miner actor's address. When either is lost or corrupted the miner
//! cannot proceed; this tool inspects and repairs them.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, resolves config, dispatches)
//! - [`core`] - Repository locking, datastore namespaces, metadata records, codecs
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. The metadata namespace is only opened under the exclusive repository lock
//! 2. The lock is released on every exit path
//! 3. The stored counter never decreases except through explicit repair
//! 4. Inputs are validated before any write; corrupt bytes are reported, not rewritten

pub mod cli;
pub mod core;
pub mod ui;
