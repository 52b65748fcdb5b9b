//! core::paths
//!
//! Centralized path routing for storage-miner repository locations.
//!
//! # Storage Layout
//!
//! A repository is a directory laid out as:
//! - `datastore/` - Key-value namespaces, one sub-directory per namespace
//! - `datastore/metadata/` - The metadata namespace (counter, miner address)
//! - `repo.lock` - Exclusive lock file
//!
//! **Hard rule:** No code outside this module joins repository-relative
//! path segments. Everything goes through `RepoPaths`.
//!
//! # Example
//!
//! ```
//! use filminerctl::core::paths::RepoPaths;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(PathBuf::from("/srv/miner"));
//!
//! assert_eq!(paths.lock_path(), PathBuf::from("/srv/miner/repo.lock"));
//! assert_eq!(
//!     paths.namespace_dir("/metadata"),
//!     Some(PathBuf::from("/srv/miner/datastore/metadata"))
//! );
//! ```

use std::path::{Path, PathBuf};

/// Name of the directory holding all datastore namespaces.
const DATASTORE_DIR: &str = "datastore";

/// Name of the repository lock file.
const LOCK_FILE: &str = "repo.lock";

/// Centralized path routing for a repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    /// Repository root directory.
    pub root: PathBuf,
}

impl RepoPaths {
    /// Create path routing for the repository at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the datastore directory.
    ///
    /// This is `<root>/datastore`. Its presence is what marks a repository
    /// as initialized.
    pub fn datastore_dir(&self) -> PathBuf {
        self.root.join(DATASTORE_DIR)
    }

    /// Get the directory backing a datastore namespace.
    ///
    /// The prefix is split on `/`; empty, `.` and `..` segments are
    /// dropped so a prefix can never escape the datastore directory.
    /// Returns `None` when nothing is left (the root prefix).
    ///
    /// # Example
    ///
    /// ```
    /// use filminerctl::core::paths::RepoPaths;
    /// use std::path::PathBuf;
    ///
    /// let paths = RepoPaths::new(PathBuf::from("/r"));
    /// assert_eq!(
    ///     paths.namespace_dir("/a/b"),
    ///     Some(PathBuf::from("/r/datastore/a/b"))
    /// );
    /// assert_eq!(paths.namespace_dir("/"), None);
    /// ```
    pub fn namespace_dir(&self, prefix: &str) -> Option<PathBuf> {
        let mut segments = prefix
            .split('/')
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .peekable();
        segments.peek()?;

        let mut dir = self.datastore_dir();
        for segment in segments {
            dir.push(segment);
        }
        Some(dir)
    }

    /// Get the path to the repository lock file.
    ///
    /// This is `<root>/repo.lock`.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Get the repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
