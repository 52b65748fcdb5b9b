//! core::ops::lock
//!
//! Exclusive repository lock.
//!
//! # Architecture
//!
//! The repo lock ensures only one process can touch the repository's
//! datastore at a time. A storage-miner daemon and a repair invocation
//! must never interleave writes to the metadata namespace; the stored
//! counter relies on this for its read-then-write step.
//!
//! Every [`LockKind`] locks the same `<root>/repo.lock` file, so any two
//! holders conflict regardless of kind.
//!
//! # Invariants
//!
//! - Lock must be held for the entire administrative operation
//! - Lock is automatically released on drop (RAII pattern)
//! - Lock acquisition is non-blocking (fails fast if locked)
//! - Release is idempotent
//!
//! # Example
//!
//! ```ignore
//! use filminerctl::core::ops::lock::{LockKind, RepoLock};
//! use filminerctl::core::paths::RepoPaths;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(PathBuf::from("/srv/miner"));
//! let lock = RepoLock::acquire(&paths, LockKind::StorageMiner)?;
//!
//! // Perform operations while holding lock
//! // ...
//!
//! // Lock automatically released when dropped
//! drop(lock);
//! ```

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::RepoPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("repository is locked by another process (held by: {holder})")]
    AlreadyLocked {
        /// Holder description read from the lock file, or "unknown".
        holder: String,
    },

    /// Failed to create or open the lock file.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// The category of process holding a repository.
///
/// Kinds name the holder in diagnostics; they never share a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockKind {
    /// A full chain node.
    FullNode,
    /// A storage miner (the kind repair commands take).
    StorageMiner,
    /// A sealing worker.
    Worker,
    /// A standalone wallet.
    Wallet,
}

impl LockKind {
    /// Stable name written into the lock file.
    pub fn as_str(&self) -> &'static str {
        match self {
            LockKind::FullNode => "full-node",
            LockKind::StorageMiner => "storage-miner",
            LockKind::Worker => "worker",
            LockKind::Wallet => "wallet",
        }
    }
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exclusive lock on the repository.
///
/// The lock is automatically released when this guard is dropped (RAII pattern).
/// This ensures the lock is always released, even if the operation fails
/// part-way through.
#[derive(Debug)]
pub struct RepoLock {
    /// Path to the lock file.
    path: PathBuf,
    /// Kind of holder this lock was taken as.
    kind: LockKind,
    /// The open file handle with the lock held.
    /// When this is Some, we hold the lock.
    file: Option<File>,
}

impl RepoLock {
    /// Attempt to acquire the repository lock.
    ///
    /// This uses OS-level file locking via `fs2`, which works across
    /// processes. The lock is non-blocking - if another process holds
    /// the lock, this returns `LockError::AlreadyLocked` immediately.
    ///
    /// The repository root must already exist; this never creates it.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another holder owns the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be opened
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &RepoPaths, kind: LockKind) -> Result<Self, LockError> {
        let path = paths.lock_path();

        // Open or create the lock file
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        // Try to acquire an exclusive lock (non-blocking)
        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                return Err(LockError::AlreadyLocked {
                    holder: read_holder(&path),
                });
            }
            Err(e) => return Err(LockError::AcquireFailed(e.to_string())),
        }

        let mut lock = Self {
            path,
            kind,
            file: Some(file),
        };
        lock.record_holder();

        tracing::debug!(path = %lock.path.display(), kind = %kind, "repository lock acquired");
        Ok(lock)
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the kind this lock was acquired as.
    pub fn kind(&self) -> LockKind {
        self.kind
    }

    /// Release the lock explicitly.
    ///
    /// This is called automatically on drop, but can be called early
    /// to surface release errors. Calling it more than once is a no-op.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            // Holder description is cleared before the OS lock goes away.
            let _ = file.set_len(0);
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
            tracing::debug!(path = %self.path.display(), "repository lock released");
        }
        Ok(())
    }

    /// Write `<kind> (pid <pid>)` into the held lock file.
    ///
    /// Best effort: the description is diagnostics only.
    fn record_holder(&mut self) {
        let holder = format!("{} (pid {})", self.kind, std::process::id());
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = write_holder(file, &holder) {
                tracing::debug!(error = %e, "could not record lock holder");
            }
        }
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        // Best-effort release on drop - ignore errors since we're dropping
        let _ = self.release();
    }
}

fn write_holder(file: &mut File, holder: &str) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(holder.as_bytes())?;
    file.flush()
}

/// Read the holder description from a contended lock file.
fn read_holder(path: &Path) -> String {
    let mut contents = String::new();
    match File::open(path).and_then(|mut f| f.read_to_string(&mut contents)) {
        Ok(_) if !contents.trim().is_empty() => contents.trim().to_string(),
        _ => "unknown".to_string(),
    }
}
