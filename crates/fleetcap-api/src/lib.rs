//! fleetcap-api — HTTP surface for capacity summaries.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/capacity?region=R&token=T` | Summary as text, or JSON with `accept: application/json` |
//! | POST | `/capacity` | Chat slash command (form fields `token`, `text` = region) |
//! | GET | `/healthz` | Liveness probe, unauthenticated |
//!
//! Every `/capacity` request is authenticated before any inventory is
//! loaded.

pub mod auth;
pub mod error;
pub mod format;
pub mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use fleetcap_inventory::CapacityService;

pub use auth::RequestAuthenticator;
pub use error::{ApiError, ApiResult};
pub use format::Format;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<CapacityService>,
    pub auth: RequestAuthenticator,
}

/// Build the API router.
pub fn build_router(service: Arc<CapacityService>, auth: RequestAuthenticator) -> Router {
    let state = ApiState { service, auth };

    Router::new()
        .route(
            "/capacity",
            get(handlers::capacity_query).post(handlers::capacity_command),
        )
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
