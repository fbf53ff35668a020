use axum::{
    Json, Router,
    extract::Request,
    middleware::{self as axum_middleware, Next},
    routing::get,
};
use keyshelf_core::config::ServerConfig;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::middleware;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health_check() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let mut api = api::router();

    if let Some(token) = config.api_token.clone() {
        api = api.layer(axum_middleware::from_fn(move |req: Request, next: Next| {
            let token = token.clone();
            async move { middleware::auth::require_api_token(req, next, token).await }
        }));
    }

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(middleware::cors::build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
