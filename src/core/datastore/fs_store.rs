//! core::datastore::fs_store
//!
//! File-backed datastore namespace.
//!
//! # Storage
//!
//! - One file per key inside the namespace directory
//! - File name is the lowercase hex encoding of the cleaned key, so key
//!   slashes never create sub-directories or escape the namespace
//! - All writes are atomic (write to temp file, sync, then rename)
//!
//! # Example
//!
//! ```ignore
//! use filminerctl::core::datastore::{Datastore, FsDatastore, Key};
//!
//! let ds = FsDatastore::open("/srv/miner/datastore/metadata".into())?;
//! ds.put(&Key::new("/storage/nextid"), &7u64.to_be_bytes())?;
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::traits::{ensure_value_key, Datastore, DatastoreError};
use super::Key;

/// Extension used for in-flight writes.
const TEMP_EXTENSION: &str = "tmp";

/// A datastore namespace stored as a directory of value files.
#[derive(Debug)]
pub struct FsDatastore {
    /// Namespace directory.
    dir: PathBuf,
}

impl FsDatastore {
    /// Open the namespace at `dir`, creating the directory if absent.
    pub fn open(dir: PathBuf) -> Result<Self, DatastoreError> {
        fs::create_dir_all(&dir).map_err(|e| DatastoreError::Write {
            key: dir.display().to_string(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    /// Get the namespace directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    fn value_path(&self, key: &Key) -> PathBuf {
        self.dir.join(hex::encode(key.as_bytes()))
    }

    /// Decode a directory entry name back into a key.
    ///
    /// Returns `None` for temp files and anything this store did not write.
    fn key_from_file_name(name: &str) -> Option<Key> {
        let bytes = hex::decode(name).ok()?;
        let raw = String::from_utf8(bytes).ok()?;
        let key = Key::new(&raw);
        (key.as_str() == raw && !key.is_root()).then_some(key)
    }
}

impl Datastore for FsDatastore {
    fn get(&self, key: &Key) -> Result<Vec<u8>, DatastoreError> {
        match fs::read(self.value_path(key)) {
            Ok(value) => Ok(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DatastoreError::NotFound(key.clone()))
            }
            Err(e) => Err(DatastoreError::Read {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn put(&self, key: &Key, value: &[u8]) -> Result<(), DatastoreError> {
        ensure_value_key(key)?;

        let path = self.value_path(key);
        let temp_path = path.with_extension(TEMP_EXTENSION);
        let write_err = |e: io::Error| DatastoreError::Write {
            key: key.to_string(),
            source: e,
        };

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(write_err)?;
            file.write_all(value).map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(write_err)?;

        tracing::trace!(key = %key, len = value.len(), "datastore put");
        Ok(())
    }

    fn has(&self, key: &Key) -> Result<bool, DatastoreError> {
        Ok(self.value_path(key).is_file())
    }

    fn delete(&self, key: &Key) -> Result<(), DatastoreError> {
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DatastoreError::Write {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn keys(&self) -> Result<Vec<Key>, DatastoreError> {
        let read_err = |e: io::Error| DatastoreError::Read {
            key: self.dir.display().to_string(),
            source: e,
        };

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if !entry.file_type().map_err(read_err)?.is_file() {
                continue;
            }
            if let Some(key) = entry.file_name().to_str().and_then(Self::key_from_file_name) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
