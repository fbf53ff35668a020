pub mod auth;
pub mod config;
pub mod error;
pub mod mask;
pub mod models;
pub mod paths;
pub mod services;
pub mod storage;
pub mod supabase;
pub mod validation;
pub mod view;

pub use config::{AppConfig, StoreBackend};
pub use error::KeyError;
pub use mask::mask_key;
pub use models::*;

use auth::SessionContext;
use std::sync::Arc;
use storage::{KeyStore, LocalKeyStore, RemoteKeyStore};
use tracing::info;

/// Core application state shared between the server and the CLI
pub struct AppCore {
    pub store: Arc<dyn KeyStore>,
    pub session: SessionContext,
}

impl AppCore {
    /// Open the store selected by `config`.
    ///
    /// The session context is handed to the remote store so requests run as
    /// the signed-in user.
    pub async fn new(config: &AppConfig, session: SessionContext) -> anyhow::Result<Self> {
        let store: Arc<dyn KeyStore> = match config.store.backend {
            StoreBackend::Local => {
                let db_path = config.database_path()?;
                info!(path = %db_path.display(), "Using local key store");
                Arc::new(LocalKeyStore::open(&db_path)?)
            }
            StoreBackend::Remote => {
                let supabase = config.supabase_config()?;
                info!(table = %config.store.table, "Using remote key store");
                Arc::new(RemoteKeyStore::new(
                    supabase,
                    config.store.table.clone(),
                    session.clone(),
                ))
            }
        };

        Ok(Self::with_store(store, session))
    }

    pub fn with_store(store: Arc<dyn KeyStore>, session: SessionContext) -> Self {
        Self { store, session }
    }
}
