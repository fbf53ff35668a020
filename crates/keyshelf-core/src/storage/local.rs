//! Typed key storage wrapper over the embedded database.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use keyshelf_storage::Storage;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

use super::KeyStore;
use crate::models::{KeyPatch, KeyRecord, NewKey, sort_newest_first};

/// Typed key storage wrapper around keyshelf-storage::KeyStorage.
#[derive(Clone)]
pub struct LocalKeyStore {
    inner: keyshelf_storage::KeyStorage,
}

impl LocalKeyStore {
    pub fn new(storage: &Storage) -> Self {
        Self {
            inner: storage.keys.clone(),
        }
    }

    /// Open (or create) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let storage = Storage::new(path)?;
        Ok(Self::new(&storage))
    }

    fn decode(bytes: &[u8]) -> Result<KeyRecord> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[async_trait]
impl KeyStore for LocalKeyStore {
    async fn list(&self) -> Result<Vec<KeyRecord>> {
        let mut records = self
            .inner
            .list_raw()?
            .into_iter()
            .map(|(_, bytes)| Self::decode(&bytes))
            .collect::<Result<Vec<_>>>()?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn insert(&self, new_key: NewKey) -> Result<KeyRecord> {
        let record = KeyRecord::from_new(Uuid::new_v4().to_string(), new_key, Utc::now());
        let json_bytes = serde_json::to_vec(&record)?;
        self.inner.insert_new_raw(&record.id, &json_bytes)?;
        debug!(id = %record.id, "Inserted API key");
        Ok(record)
    }

    async fn update(&self, id: &str, patch: KeyPatch) -> Result<KeyRecord> {
        let updated = self.inner.modify_raw(id, |current| {
            let mut record = Self::decode(current)?;
            record.apply(patch);
            Ok(serde_json::to_vec(&record)?)
        })?;

        match updated {
            Some(bytes) => Self::decode(&bytes),
            None => Err(anyhow::anyhow!("API key {} not found", id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let existed = self.inner.delete(id)?;
        debug!(id, existed, "Deleted API key");
        Ok(())
    }
}
