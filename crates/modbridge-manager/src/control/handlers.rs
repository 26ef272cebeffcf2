//! Handlers for the manager control surface.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use modbridge_types::ids::BotId;
use serde_json::json;

use crate::commands::ManagerHandle;

pub async fn health(State(handle): State<ManagerHandle>) -> Response {
    match handle.health().await {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
    }
}

pub async fn status(State(handle): State<ManagerHandle>) -> Response {
    Json(handle.status().await).into_response()
}

pub async fn restart_bot(State(handle): State<ManagerHandle>, Path(bot_id): Path<i64>) -> Response {
    handle.restart_bot(BotId(bot_id)).await;
    (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))).into_response()
}
