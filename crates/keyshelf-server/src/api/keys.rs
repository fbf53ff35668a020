use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, put},
};
use keyshelf_core::KeyRecord;
use keyshelf_core::services::keys as keys_service;
use serde::Deserialize;

use super::{ApiError, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/keys", get(list_keys).post(create_key))
        .route("/keys/{id}", put(update_key).delete(delete_key))
}

// Missing fields deserialize to None so they are reported with the same
// message as blank ones.
#[derive(Deserialize)]
pub struct CreateKeyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, rename = "type")]
    pub key_type: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateKeyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// List all keys, newest first
async fn list_keys(State(state): State<AppState>) -> Result<Json<Vec<KeyRecord>>, ApiError> {
    let keys = keys_service::list_keys(&state.core)
        .await
        .map_err(|err| state.key_error(err))?;
    Ok(Json(keys))
}

/// Create a new key
async fn create_key(
    State(state): State<AppState>,
    payload: Result<Json<CreateKeyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<KeyRecord>), ApiError> {
    let Json(req) = payload?;
    let record = keys_service::create_key(
        &state.core,
        req.name.as_deref().unwrap_or_default(),
        req.value.as_deref().unwrap_or_default(),
        req.key_type.as_deref(),
    )
    .await
    .map_err(|err| state.key_error(err))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Update name and value of an existing key
async fn update_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateKeyRequest>, JsonRejection>,
) -> Result<Json<KeyRecord>, ApiError> {
    let Json(req) = payload?;
    let record = keys_service::update_key(
        &state.core,
        &id,
        req.name.as_deref().unwrap_or_default(),
        req.value.as_deref().unwrap_or_default(),
    )
    .await
    .map_err(|err| state.key_error(err))?;
    Ok(Json(record))
}

/// Delete a key
async fn delete_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    keys_service::delete_key(&state.core, &id)
        .await
        .map_err(|err| state.key_error(err))?;
    Ok(StatusCode::NO_CONTENT)
}
