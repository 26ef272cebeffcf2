//! `GET /entities/:id/data` and the fan-out triplet
//! `POST /entities/:id/{update,assign,unassign,status}` (§4.5).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use modbridge_core::repository::entity::EntityRepository;
use modbridge_core::repository::relation::BotEntityRelationRepository;
use modbridge_infra::http::worker_control::FanOutOutcome;
use modbridge_types::entity::{Entity, EntityStatus};
use modbridge_types::ids::EntityGuid;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

pub async fn get_data(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<Entity>, AppError> {
    let guid = EntityGuid::from(guid);
    let entity = state.entities.get(&guid).await?.ok_or(AppError::NotFound)?;
    Ok(Json(entity))
}

/// Maps a fan-out attempt to the data-plane's 200-vs-202 contract (§4.5, §7):
/// 200 on happy-path delivery, 202 when the worker could not be notified (it
/// will pick the change up on its next reconciliation).
fn fan_out_response(outcome: FanOutOutcome) -> Response {
    match outcome {
        FanOutOutcome::Delivered => (StatusCode::OK, Json(json!({"status": "delivered"}))).into_response(),
        FanOutOutcome::WorkerUnreachable => {
            (StatusCode::ACCEPTED, Json(json!({"status": "accepted"}))).into_response()
        }
    }
}

async fn owning_bot(state: &AppState, guid: &EntityGuid) -> Result<modbridge_types::ids::BotId, AppError> {
    state.relations.owner_of(guid).await?.ok_or(AppError::NotFound)
}

pub async fn update(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Response, AppError> {
    let guid = EntityGuid::from(guid);
    let bot_id = owning_bot(&state, &guid).await?;
    let outcome = state.worker_control.update(bot_id, &guid).await;
    Ok(fan_out_response(outcome))
}

pub async fn assign(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Response, AppError> {
    let guid = EntityGuid::from(guid);
    let bot_id = owning_bot(&state, &guid).await?;
    let outcome = state.worker_control.assign(bot_id, &guid).await;
    Ok(fan_out_response(outcome))
}

pub async fn unassign(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Response, AppError> {
    let guid = EntityGuid::from(guid);
    let bot_id = owning_bot(&state, &guid).await?;
    let outcome = state.worker_control.unassign(bot_id, &guid).await;
    Ok(fan_out_response(outcome))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: EntityStatus,
}

/// Persists the new status, then fans out `assign`/`unassign` to the owning
/// worker so it joins or drops the room without waiting for its next
/// periodic reconciliation. Also the endpoint a worker itself calls after a
/// 404 against an entity JID (§4.1.5) -- the owning worker is itself in that
/// case, so the resulting fan-out is a harmless no-op reconfirmation.
pub async fn set_status(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Response, AppError> {
    let guid = EntityGuid::from(guid);
    state.entities.set_status(&guid, body.status).await?;

    let Some(bot_id) = state.relations.owner_of(&guid).await? else {
        return Ok((StatusCode::OK, Json(json!({"status": "updated", "fan_out": "no_owner"}))).into_response());
    };

    let outcome = match body.status {
        EntityStatus::Active => state.worker_control.assign(bot_id, &guid).await,
        EntityStatus::Inactive => state.worker_control.unassign(bot_id, &guid).await,
    };
    Ok(fan_out_response(outcome))
}
