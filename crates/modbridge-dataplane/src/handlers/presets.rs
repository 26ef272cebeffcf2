//! `GET /profanity-filter-presets/:id` and the refresh fan-out (§4.5).

use axum::Json;
use axum::extract::{Path, State};
use modbridge_core::moderation::validate::filter_valid_words;
use modbridge_core::repository::preset::PresetRepository;
use modbridge_types::ids::PresetId;
use modbridge_types::profanity::Preset;
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Preset>, AppError> {
    let mut preset = state.presets.get(PresetId(id)).await?.ok_or(AppError::NotFound)?;

    let (valid, rejected) = filter_valid_words(&preset.words);
    for bad in &rejected {
        tracing::warn!(preset_id = id, field = %bad.field, reason = %bad.reason, "rejected malformed preset word at data-plane boundary");
    }
    preset.words = valid;

    Ok(Json(preset))
}

/// Best-effort fan-out to every active worker (§4.5). Individual
/// unreachable workers are not failures -- they pick up the refreshed
/// preset on their next `/bots/:id/config` cycle or explicit retry.
pub async fn refresh(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let preset_id = PresetId(id);
    let bot_ids = state.presets.active_bot_ids().await?;

    let mut delivered = 0usize;
    for bot_id in &bot_ids {
        if state.worker_control.refresh_preset(*bot_id, preset_id).await
            == modbridge_infra::http::worker_control::FanOutOutcome::Delivered
        {
            delivered += 1;
        }
    }

    Ok(Json(json!({
        "notified": bot_ids.len(),
        "delivered": delivered,
    })))
}
