//! Connection settings shared by the hosted record store and auth clients.

use anyhow::{Result, bail};
use serde_json::Value;
use url::Url;

/// Project URL and public (anon) key of a hosted Supabase project.
#[derive(Clone)]
pub struct SupabaseConfig {
    base_url: Url,
    anon_key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("base_url", &self.base_url.as_str())
            .field("anon_key", &"<redacted>")
            .finish()
    }
}

impl SupabaseConfig {
    pub fn new(url: &str, anon_key: &str) -> Result<Self> {
        if url.trim().is_empty() || anon_key.trim().is_empty() {
            bail!("Supabase URL and anon key are required.");
        }
        let base_url = Url::parse(url.trim().trim_end_matches('/'))?;
        Ok(Self {
            base_url,
            anon_key: anon_key.trim().to_string(),
        })
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Join `path` (e.g. `rest/v1/api_keys`) onto the project URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow::anyhow!("Supabase URL cannot be a base: {}", self.base_url))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        Ok(url)
    }
}

/// Pull a human-readable message out of a Supabase error body.
///
/// PostgREST uses `message`; GoTrue uses `error_description`, `msg` or
/// `error`. Falls back to the raw body, then to the status line.
pub fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error_description", "msg", "error"] {
            if let Some(message) = json.get(field).and_then(Value::as_str)
                && !message.trim().is_empty()
            {
                return message.to_string();
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!("Request failed with status {status}")
    } else {
        body.to_string()
    }
}
