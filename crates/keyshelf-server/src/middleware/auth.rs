use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::ApiError;

/// Reject requests whose bearer token does not match `expected`.
pub async fn require_api_token(req: Request, next: Next, expected: String) -> Response {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return ApiError::unauthorized("Missing Authorization header").into_response();
    };

    let Ok(header_value) = value.to_str() else {
        return ApiError::unauthorized("Invalid Authorization header").into_response();
    };

    let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);
    if token != expected {
        return ApiError::unauthorized("Invalid API token").into_response();
    }

    next.run(req).await
}
