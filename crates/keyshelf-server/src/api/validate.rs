use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use keyshelf_core::ValidationOutcome;
use keyshelf_core::services::keys as keys_service;
use serde::Deserialize;

use super::{ApiError, AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(validate_key))
}

#[derive(Deserialize)]
pub struct ValidateKeyRequest {
    #[serde(default)]
    pub key: Option<String>,
}

/// Check whether a candidate key is stored
async fn validate_key(
    State(state): State<AppState>,
    payload: Result<Json<ValidateKeyRequest>, JsonRejection>,
) -> Result<Json<ValidationOutcome>, ApiError> {
    let Json(req) = payload?;
    let outcome = keys_service::validate_key(&state.core, req.key.as_deref().unwrap_or_default())
        .await
        .map_err(|err| state.key_error(err))?;
    Ok(Json(outcome))
}
