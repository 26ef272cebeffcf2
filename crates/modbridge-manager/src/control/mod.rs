//! The manager's HTTP surface (§4.6): `GET /health`, `GET /status`,
//! `POST /restart-bot/:botId`. Bound to `manager_health_port`.

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::commands::ManagerHandle;

pub fn build_router(handle: ManagerHandle) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/restart-bot/{botId}", post(handlers::restart_bot))
        .with_state(handle)
        .layer(TraceLayer::new_for_http())
}
