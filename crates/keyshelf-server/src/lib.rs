//! HTTP surface for the key dashboard.

pub mod api;
pub mod middleware;
pub mod router;

pub use api::{ApiError, AppState};
pub use router::build_router;
