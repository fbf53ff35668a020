use keyshelf_core::{AppCore, KeyError};
use std::sync::Arc;

use super::ApiError;

/// Message sent in place of store errors when they are not exposed.
pub const GENERIC_STORE_ERROR: &str = "Internal server error";

/// Application state shared across all API handlers
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<AppCore>,
    pub expose_store_errors: bool,
}

impl AppState {
    pub fn new(core: Arc<AppCore>, expose_store_errors: bool) -> Self {
        Self {
            core,
            expose_store_errors,
        }
    }

    /// Map a service error to its HTTP form.
    pub fn key_error(&self, err: KeyError) -> ApiError {
        match err {
            KeyError::Validation(message) => ApiError::bad_request(message),
            KeyError::StoreUnavailable(message) => {
                tracing::error!(error = %message, "Key store error");
                if self.expose_store_errors {
                    ApiError::internal(message)
                } else {
                    ApiError::internal(GENERIC_STORE_ERROR)
                }
            }
        }
    }
}
