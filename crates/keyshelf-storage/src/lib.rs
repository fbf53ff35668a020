//! Keyshelf Storage - low-level persistence for API key records
//!
//! This crate wraps an embedded redb database and exposes byte-level APIs.
//! It knows nothing about the shape of a key record; the typed wrapper in
//! `keyshelf-core` owns serialization and ordering.
//!
//! # Tables
//!
//! - `api_keys` - API key records, keyed by record id

pub mod keys;
pub mod simple_storage;

use anyhow::Result;
use redb::Database;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub use keys::KeyStorage;
pub use simple_storage::SimpleStorage;

/// Central storage manager that opens the database and its tables
pub struct Storage {
    db: Arc<Database>,
    pub keys: KeyStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// Creates the database file if it doesn't exist and initializes all
    /// required tables.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening key database");
        let db = Arc::new(Database::create(path)?);
        let keys = KeyStorage::new(db.clone())?;

        Ok(Self { db, keys })
    }

    /// Get a reference to the underlying database
    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_creates_tables() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(temp_dir.path().join("keys.db")).unwrap();

        assert_eq!(storage.keys.count().unwrap(), 0);
        storage.keys.put_raw("key-1", b"{}").unwrap();

        let reopened = KeyStorage::new(storage.get_db()).unwrap();
        assert!(reopened.exists("key-1").unwrap());
    }
}
