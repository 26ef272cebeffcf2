//! Handlers for the worker control surface (§6). Every mutating call is a
//! fire-and-forget enqueue into the session driver's command channel --
//! the driver is the sole owner of the state these commands touch (§5).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use modbridge_types::ids::{EntityGuid, PresetId};
use serde_json::json;

use crate::session::commands::WorkerHandle;

fn accepted() -> Response {
    (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))).into_response()
}

pub async fn assign(State(handle): State<WorkerHandle>, Path(entity_id): Path<String>) -> Response {
    handle.assign(EntityGuid::from(entity_id), None).await;
    accepted()
}

pub async fn unassign(State(handle): State<WorkerHandle>, Path(entity_id): Path<String>) -> Response {
    handle.unassign(EntityGuid::from(entity_id)).await;
    accepted()
}

pub async fn update(State(handle): State<WorkerHandle>, Path(entity_id): Path<String>) -> Response {
    handle.update(EntityGuid::from(entity_id)).await;
    accepted()
}

pub async fn refresh_preset(State(handle): State<WorkerHandle>, Path(preset_id): Path<i64>) -> Response {
    handle.refresh_preset(PresetId(preset_id)).await;
    accepted()
}

pub async fn reconnection_state(State(handle): State<WorkerHandle>) -> Response {
    match handle.reconnection_state().await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "session driver unreachable" }))).into_response(),
    }
}

pub async fn exit_process(State(handle): State<WorkerHandle>) -> Response {
    handle.exit_process().await;
    accepted()
}
