pub mod error;
pub mod keys;
pub mod state;
pub mod validate;

pub use error::ApiError;
pub use state::AppState;

use axum::Router;

/// Build the `/api` router with all resource routes
pub fn router() -> Router<AppState> {
    Router::new().merge(keys::router()).merge(validate::router())
}
