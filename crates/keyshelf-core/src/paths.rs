use anyhow::Result;
use std::path::PathBuf;

const KEYSHELF_DIR: &str = ".keyshelf";
const DB_FILE: &str = "keyshelf.db";
const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";
const LOGS_DIR: &str = "logs";

/// Environment variable to override the Keyshelf directory.
const KEYSHELF_DIR_ENV: &str = "KEYSHELF_DIR";

/// Resolve the Keyshelf data directory.
/// Priority: KEYSHELF_DIR env var > ~/.keyshelf/
pub fn resolve_keyshelf_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(KEYSHELF_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(KEYSHELF_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the Keyshelf directory exists and return its path.
pub fn ensure_keyshelf_dir() -> Result<PathBuf> {
    let dir = resolve_keyshelf_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default database path: ~/.keyshelf/keyshelf.db (directory is created).
pub fn ensure_database_path() -> Result<PathBuf> {
    Ok(ensure_keyshelf_dir()?.join(DB_FILE))
}

/// User config file: ~/.keyshelf/config.toml
pub fn config_path() -> Result<PathBuf> {
    Ok(resolve_keyshelf_dir()?.join(CONFIG_FILE))
}

/// Persisted identity-provider session: ~/.keyshelf/session.json
pub fn session_path() -> Result<PathBuf> {
    Ok(resolve_keyshelf_dir()?.join(SESSION_FILE))
}

/// Log directory: ~/.keyshelf/logs/ (created on demand)
pub fn logs_dir() -> Result<PathBuf> {
    let dir = resolve_keyshelf_dir()?.join(LOGS_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
