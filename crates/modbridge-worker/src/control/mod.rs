//! The worker's loopback control surface (§6): `POST /assign/:entityId`,
//! `/unassign`, `/update`, `/refresh-preset/:presetId`,
//! `GET /reconnection-state`, `POST /exit-process`. Bound to
//! `127.0.0.1:(4000 + bot_id)`, reachable only from the data-plane and the
//! manager on the same host -- no auth layer, unlike the data-plane's own
//! dashboard-facing surface.

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::session::commands::WorkerHandle;

pub fn build_router(handle: WorkerHandle) -> Router {
    Router::new()
        .route("/assign/{entityId}", post(handlers::assign))
        .route("/unassign/{entityId}", post(handlers::unassign))
        .route("/update/{entityId}", post(handlers::update))
        .route("/refresh-preset/{presetId}", post(handlers::refresh_preset))
        .route("/reconnection-state", get(handlers::reconnection_state))
        .route("/exit-process", post(handlers::exit_process))
        .with_state(handle)
        .layer(TraceLayer::new_for_http())
}
