//! Configuration loading.
//!
//! Looks for a TOML file at `$KEYSHELF_CONFIG`, then `./keyshelf.toml`, then
//! `~/.keyshelf/config.toml`. Without a file, settings come from environment
//! variables. Supabase credentials missing from the file are still picked up
//! from the environment.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::storage::remote::DEFAULT_TABLE;
use crate::supabase::SupabaseConfig;

const LOCAL_CONFIG_FILE: &str = "keyshelf.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub supabase: SupabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty or `*` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// When set, `/api` requests must carry `Authorization: Bearer <token>`.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Pass store error messages to HTTP clients unchanged.
    #[serde(default = "default_expose_store_errors")]
    pub expose_store_errors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            api_token: None,
            expose_store_errors: default_expose_store_errors(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Embedded redb database
    #[default]
    Local,
    /// Hosted PostgREST table
    Remote,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StoreBackend::Local),
            "remote" | "supabase" => Ok(StoreBackend::Remote),
            other => Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            db_path: None,
            table: default_table(),
        }
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct SupabaseSection {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
}

impl std::fmt::Debug for SupabaseSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSection")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_expose_store_errors() -> bool {
    true
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        match config_file_path(&lookup)? {
            Some(path) => Self::from_file(&path, &lookup),
            None => Ok(Self::from_lookup(&lookup)),
        }
    }

    pub fn from_file(path: &Path, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path.display(), err))?;
        Self::from_toml_str(&contents, lookup)
            .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), err))
    }

    pub fn from_toml_str(contents: &str, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(contents)?;
        if config.supabase.url.is_none() {
            config.supabase.url = supabase_url(lookup);
        }
        if config.supabase.anon_key.is_none() {
            config.supabase.anon_key = supabase_anon_key(lookup);
        }
        Ok(config)
    }

    /// Build a configuration purely from environment-style variables.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let server = ServerConfig {
            host: var("KEYSHELF_HOST").unwrap_or_else(default_host),
            port: var("KEYSHELF_PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or_else(default_port),
            cors_origins: var("KEYSHELF_CORS_ORIGINS")
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_else(default_cors_origins),
            api_token: var("KEYSHELF_API_TOKEN"),
            expose_store_errors: var("KEYSHELF_EXPOSE_STORE_ERRORS")
                .and_then(|value| parse_bool(&value))
                .unwrap_or_else(default_expose_store_errors),
        };

        let store = StoreConfig {
            backend: var("KEYSHELF_STORE")
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            db_path: var("KEYSHELF_DB_PATH").map(PathBuf::from),
            table: var("KEYSHELF_TABLE").unwrap_or_else(default_table),
        };

        let supabase = SupabaseSection {
            url: supabase_url(lookup),
            anon_key: supabase_anon_key(lookup),
        };

        Self {
            server,
            store,
            supabase,
        }
    }

    /// Connection settings for the hosted project; errors when incomplete.
    pub fn supabase_config(&self) -> Result<SupabaseConfig> {
        SupabaseConfig::new(
            self.supabase.url.as_deref().unwrap_or_default(),
            self.supabase.anon_key.as_deref().unwrap_or_default(),
        )
    }

    /// Database path for the local backend, defaulting to ~/.keyshelf/keyshelf.db.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.store.db_path {
            Some(path) => Ok(path.clone()),
            None => paths::ensure_database_path(),
        }
    }
}

fn config_file_path(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Option<PathBuf>> {
    if let Some(path) = lookup("KEYSHELF_CONFIG").filter(|path| !path.trim().is_empty()) {
        return Ok(Some(PathBuf::from(path)));
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }
    let user = paths::config_path()?;
    Ok(user.exists().then_some(user))
}

fn supabase_url(lookup: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    lookup("SUPABASE_URL").or_else(|| lookup("NEXT_PUBLIC_SUPABASE_URL"))
}

fn supabase_anon_key(lookup: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    lookup("SUPABASE_ANON_KEY").or_else(|| lookup("NEXT_PUBLIC_SUPABASE_ANON_KEY"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(&lookup_from(&[]));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.expose_store_errors);
        assert!(config.server.api_token.is_none());
        assert_eq!(config.store.backend, StoreBackend::Local);
        assert_eq!(config.store.table, "api_keys");
        assert!(config.supabase_config().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(&lookup_from(&[
            ("KEYSHELF_HOST", "0.0.0.0"),
            ("KEYSHELF_PORT", "8088"),
            ("KEYSHELF_STORE", "supabase"),
            ("KEYSHELF_CORS_ORIGINS", "https://a.example, https://b.example"),
            ("KEYSHELF_API_TOKEN", "tok"),
            ("KEYSHELF_EXPOSE_STORE_ERRORS", "false"),
            ("NEXT_PUBLIC_SUPABASE_URL", "https://proj.supabase.co"),
            ("NEXT_PUBLIC_SUPABASE_ANON_KEY", "anon"),
        ]));

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.store.backend, StoreBackend::Remote);
        assert_eq!(
            config.server.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.server.api_token.as_deref(), Some("tok"));
        assert!(!config.server.expose_store_errors);
        assert!(config.supabase_config().is_ok());
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = AppConfig::from_lookup(&lookup_from(&[("KEYSHELF_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_toml_file_with_env_credentials() {
        let toml = r#"
            [server]
            port = 9000
            cors_origins = ["*"]

            [store]
            backend = "remote"
            table = "keys"
        "#;
        let config = AppConfig::from_toml_str(
            toml,
            &lookup_from(&[
                ("SUPABASE_URL", "https://proj.supabase.co"),
                ("SUPABASE_ANON_KEY", "anon"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.store.backend, StoreBackend::Remote);
        assert_eq!(config.store.table, "keys");
        assert_eq!(config.supabase.url.as_deref(), Some("https://proj.supabase.co"));
    }

    #[test]
    fn test_toml_rejects_unknown_backend() {
        let toml = "[store]\nbackend = \"mysql\"\n";
        assert!(AppConfig::from_toml_str(toml, &lookup_from(&[])).is_err());
    }

    #[test]
    fn test_supabase_section_debug_redacts_key() {
        let section = SupabaseSection {
            url: Some("https://proj.supabase.co".to_string()),
            anon_key: Some("anon-secret".to_string()),
        };
        assert!(!format!("{section:?}").contains("anon-secret"));
    }
}
