//! CLI setup module
//!
//! Loads configuration and the persisted session, then opens the key store.

use anyhow::Result;
use keyshelf_core::auth::{SessionContext, load_session};
use keyshelf_core::{AppConfig, AppCore, paths};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Load the config, letting `--db-path` override the local store location.
pub fn load_config(db_path: Option<PathBuf>) -> Result<AppConfig> {
    let mut config = AppConfig::load()?;
    if let Some(db_path) = db_path {
        config.store.db_path = Some(db_path);
    }
    Ok(config)
}

/// Session saved by `keyshelf auth login`; an unreadable file counts as signed out.
pub fn load_session_context() -> Result<SessionContext> {
    let path = paths::session_path()?;
    let session = load_session(&path).unwrap_or_else(|err| {
        warn!(error = %err, "Ignoring unreadable session file");
        None
    });
    Ok(SessionContext::new(session))
}

/// Build the core against the configured store
pub async fn prepare_core(config: &AppConfig, session: SessionContext) -> Result<Arc<AppCore>> {
    Ok(Arc::new(AppCore::new(config, session).await?))
}
