//! `GET /profanity-filter-config/:entityId` (§4.5): the per-entity config
//! plus the resolved manager exemption list, so workers don't need a second
//! round trip.

use axum::Json;
use axum::extract::{Path, State};
use modbridge_core::moderation::validate::filter_valid_words;
use modbridge_core::repository::profanity::ProfanityConfigRepository;
use modbridge_types::ids::EntityGuid;
use modbridge_types::profanity::ProfanityConfigExtended;

use crate::error::AppError;
use crate::state::AppState;

pub async fn get(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> Result<Json<ProfanityConfigExtended>, AppError> {
    let guid = EntityGuid::from(entity_id);
    let mut config = state.profanity.get(&guid).await?.ok_or(AppError::NotFound)?;

    let (valid, rejected) = filter_valid_words(&config.config.custom_words);
    for bad in &rejected {
        tracing::warn!(%guid, field = %bad.field, reason = %bad.reason, "rejected malformed custom word at data-plane boundary");
    }
    config.config.custom_words = valid;

    Ok(Json(config))
}
