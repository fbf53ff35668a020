//! Delegated sign-in against a hosted identity provider.

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use url::Url;

use super::session::{Session, SessionUser};
use crate::supabase::{SupabaseConfig, error_message};

/// Outcome of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The provider issued a session immediately.
    SignedIn(Session),
    /// The account exists but must be confirmed (e.g. by email) first.
    ConfirmationRequired { email: String },
}

/// Email/password and OAuth sign-in, delegated to an external provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome>;

    async fn sign_out(&self, session: &Session) -> Result<()>;

    /// URL the user opens to start an OAuth sign-in with `provider`.
    fn authorize_url(&self, provider: &str, redirect_to: Option<&str>) -> Result<Url>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: SessionUser {
                id: self.user.id,
                email: self.user.email,
            },
        }
    }
}

/// GoTrue client for a hosted Supabase project.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseAuth {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        bail!(error_message(status, &body))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let mut url = self.config.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .client
            .post(url)
            .header("apikey", self.config.anon_key())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = Self::check(response).await?.json().await?;

        let session = token.into_session();
        info!(user_id = %session.user.id, "Signed in with password");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let url = self.config.endpoint("auth/v1/signup")?;
        let response = self
            .client
            .post(url)
            .header("apikey", self.config.anon_key())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: serde_json::Value = Self::check(response).await?.json().await?;

        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)?;
            return Ok(SignUpOutcome::SignedIn(token.into_session()));
        }

        info!("Sign-up pending confirmation");
        Ok(SignUpOutcome::ConfirmationRequired {
            email: email.to_string(),
        })
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let url = self.config.endpoint("auth/v1/logout")?;
        let response = self
            .client
            .post(url)
            .header("apikey", self.config.anon_key())
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        Self::check(response).await?;
        info!(user_id = %session.user.id, "Signed out");
        Ok(())
    }

    fn authorize_url(&self, provider: &str, redirect_to: Option<&str>) -> Result<Url> {
        let mut url = self.config.endpoint("auth/v1/authorize")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider);
            if let Some(redirect_to) = redirect_to {
                query.append_pair("redirect_to", redirect_to);
            }
        }
        Ok(url)
    }
}
