//! core::repo
//!
//! Opening and locking a storage-miner repository.
//!
//! # Lifecycle
//!
//! ```text
//! Repo::open(path) -> Repo::lock(kind) -> LockedRepo::datastore(prefix) -> release
//! ```
//!
//! - `open` fails with [`RepoError::NotInitialized`] unless the path holds
//!   an initialized repository (a `datastore/` directory)
//! - `lock` fails with [`RepoError::Lock`] wrapping
//!   [`LockError::AlreadyLocked`] when any other holder owns the repository
//! - the lock is released by [`LockedRepo::release`] or on drop, so every
//!   error path out of a command releases it
//!
//! # Example
//!
//! ```ignore
//! use filminerctl::core::ops::lock::LockKind;
//! use filminerctl::core::repo::Repo;
//!
//! let repo = Repo::open("/srv/miner")?;
//! let mut locked = repo.lock(LockKind::StorageMiner)?;
//! let mds = locked.datastore("/metadata")?;
//! // ... read and write metadata ...
//! locked.release()?;
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::datastore::{DatastoreError, FsDatastore};
use crate::core::ops::lock::{LockError, LockKind, RepoLock};
use crate::core::paths::RepoPaths;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No initialized repository at the path.
    #[error("repo at {} is not initialized, run 'lotus-miner init' to set it up", .path.display())]
    NotInitialized { path: PathBuf },

    /// The repository lock could not be taken or released.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// The namespace prefix names no sub-store.
    #[error("invalid datastore namespace '{0}'")]
    InvalidNamespace(String),

    /// The repository was used after its lock was released.
    #[error("repository lock already released")]
    Released,

    /// Opening a namespace failed.
    #[error("failed to open datastore namespace: {0}")]
    Datastore(#[from] DatastoreError),
}

/// An initialized repository that has not been locked yet.
#[derive(Debug, Clone)]
pub struct Repo {
    paths: RepoPaths,
}

impl Repo {
    /// Open the repository at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::NotInitialized`] if `path` is not a directory
    /// or has no `datastore/` directory.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let paths = RepoPaths::new(path.into());
        if !paths.root().is_dir() || !paths.datastore_dir().is_dir() {
            return Err(RepoError::NotInitialized {
                path: paths.root,
            });
        }
        tracing::debug!(path = %paths.root().display(), "opened repository");
        Ok(Self { paths })
    }

    /// Get the repository root.
    pub fn path(&self) -> &Path {
        self.paths.root()
    }

    /// Take the exclusive repository lock as `kind`.
    ///
    /// Non-blocking: contention fails immediately and nothing in the
    /// repository is touched.
    pub fn lock(&self, kind: LockKind) -> Result<LockedRepo, RepoError> {
        let lock = RepoLock::acquire(&self.paths, kind)?;
        Ok(LockedRepo {
            paths: self.paths.clone(),
            lock,
        })
    }
}

/// A repository held under its exclusive lock.
///
/// Dropping the value releases the lock.
#[derive(Debug)]
pub struct LockedRepo {
    paths: RepoPaths,
    lock: RepoLock,
}

impl LockedRepo {
    /// Get the repository root.
    pub fn path(&self) -> &Path {
        self.paths.root()
    }

    /// Get the kind the lock is held as.
    pub fn kind(&self) -> LockKind {
        self.lock.kind()
    }

    /// Check whether the lock is still held.
    pub fn is_locked(&self) -> bool {
        self.lock.is_held()
    }

    /// Open (creating if absent) the datastore namespace rooted at `prefix`.
    ///
    /// # Errors
    ///
    /// - [`RepoError::Released`] after [`LockedRepo::release`]
    /// - [`RepoError::InvalidNamespace`] for the root prefix
    pub fn datastore(&self, prefix: &str) -> Result<FsDatastore, RepoError> {
        if !self.lock.is_held() {
            return Err(RepoError::Released);
        }
        let dir = self
            .paths
            .namespace_dir(prefix)
            .ok_or_else(|| RepoError::InvalidNamespace(prefix.to_string()))?;
        Ok(FsDatastore::open(dir)?)
    }

    /// Release the repository lock. Idempotent.
    pub fn release(&mut self) -> Result<(), RepoError> {
        Ok(self.lock.release()?)
    }
}
