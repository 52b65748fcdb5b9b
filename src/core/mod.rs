//! core
//!
//! Repository access, metadata records, and their encodings.
//!
//! # Modules
//!
//! - [`paths`] - Centralized path routing inside a repository
//! - [`ops`] - Exclusive repository locking
//! - [`repo`] - Open / lock / namespace / release lifecycle
//! - [`datastore`] - Ordered key-value namespaces
//! - [`metadata`] - Stored counter and miner address record
//! - [`address`] - Address string and binary codec
//! - [`config`] - Configuration loading and resolution
//!
//! # Design Principles
//!
//! - No metadata access without the repository lock held
//! - Stored bytes are decoded strictly; corruption is reported, never guessed at
//! - Inputs are validated before anything is written

pub mod address;
pub mod config;
pub mod datastore;
pub mod metadata;
pub mod ops;
pub mod paths;
pub mod repo;
