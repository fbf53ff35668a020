//! Hosted key store speaking the PostgREST dialect used by Supabase.

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::KeyStore;
use crate::auth::SessionContext;
use crate::models::{KeyPatch, KeyRecord, NewKey};
use crate::supabase::{SupabaseConfig, error_message};

/// Default table holding key records.
pub const DEFAULT_TABLE: &str = "api_keys";

/// Key store backed by a hosted table.
///
/// Requests carry the project's anon key and, when a session is active, the
/// user's access token so row-level policies apply to the signed-in user.
#[derive(Clone)]
pub struct RemoteKeyStore {
    client: Client,
    config: SupabaseConfig,
    table: String,
    session: SessionContext,
}

impl RemoteKeyStore {
    pub fn new(config: SupabaseConfig, table: impl Into<String>, session: SessionContext) -> Self {
        Self {
            client: Client::new(),
            config,
            table: table.into(),
            session,
        }
    }

    fn table_url(&self) -> Result<Url> {
        self.config.endpoint(&format!("rest/v1/{}", self.table))
    }

    fn row_url(&self, id: &str) -> Result<Url> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .session
            .access_token()
            .unwrap_or_else(|| self.config.anon_key().to_string());
        request
            .header("apikey", self.config.anon_key())
            .bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        bail!(error_message(status, &body))
    }

    async fn write_rows<T: Serialize + ?Sized>(
        &self,
        request: RequestBuilder,
        body: &T,
    ) -> Result<Vec<KeyRecord>> {
        let request = request
            .header("Prefer", "return=representation")
            .json(body);
        Ok(self.send(request).await?.json().await?)
    }
}

#[async_trait]
impl KeyStore for RemoteKeyStore {
    async fn list(&self) -> Result<Vec<KeyRecord>> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");

        let records: Vec<KeyRecord> = self.send(self.client.get(url)).await?.json().await?;
        debug!(count = records.len(), table = %self.table, "Fetched API keys");
        Ok(records)
    }

    async fn insert(&self, new_key: NewKey) -> Result<KeyRecord> {
        let url = self.table_url()?;
        let rows = self
            .write_rows(self.client.post(url), std::slice::from_ref(&new_key))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Insert into {} returned no rows", self.table))
    }

    async fn update(&self, id: &str, patch: KeyPatch) -> Result<KeyRecord> {
        let url = self.row_url(id)?;
        let rows = self.write_rows(self.client.patch(url), &patch).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("API key {} not found", id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.row_url(id)?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
