//! Key store abstraction and its implementations.

pub mod local;
pub mod remote;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{KeyPatch, KeyRecord, NewKey};

pub use local::LocalKeyStore;
pub use remote::RemoteKeyStore;

/// CRUD contract over persisted key records.
///
/// The store owns `id` and `created_at` assignment and returns listings
/// newest first.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// All records ordered by `created_at` descending.
    async fn list(&self) -> Result<Vec<KeyRecord>>;

    /// Persist a new record and return it with its assigned id and timestamp.
    async fn insert(&self, new_key: NewKey) -> Result<KeyRecord>;

    /// Replace name and value of an existing record. Errors if `id` is unknown.
    async fn update(&self, id: &str, patch: KeyPatch) -> Result<KeyRecord>;

    /// Remove the record. Removing an unknown id is not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}
