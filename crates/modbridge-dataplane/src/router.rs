//! Axum router for the data-plane HTTP surface (§4.5, §6). Unlike the
//! worker/manager control surfaces, this one is reachable from the
//! management dashboard and so carries CORS + tracing middleware.

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{RequiredToken, require_bearer_token};
use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState, auth_token: Option<String>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut api_routes = Router::new()
        .route("/bots/active", get(handlers::bots::list_active))
        .route("/bots/{id}/config", get(handlers::bots::get_config))
        .route("/bots/{id}/entities", get(handlers::bots::get_entities))
        .route("/entities/{id}/data", get(handlers::entities::get_data))
        .route("/entities/{id}/update", post(handlers::entities::update))
        .route("/entities/{id}/assign", post(handlers::entities::assign))
        .route("/entities/{id}/unassign", post(handlers::entities::unassign))
        .route("/entities/{id}/status", post(handlers::entities::set_status))
        .route("/profanity-filter-presets/{id}", get(handlers::presets::get))
        .route("/profanity-filter-presets/{id}/refresh", post(handlers::presets::refresh))
        .route("/profanity-filter-config/{entityId}", get(handlers::profanity::get))
        .with_state(state);

    if let Some(token) = auth_token {
        api_routes = api_routes.layer(middleware::from_fn_with_state(RequiredToken(token), require_bearer_token));
    }

    Router::new()
        .merge(api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
