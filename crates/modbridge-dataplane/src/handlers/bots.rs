//! `GET /bots/active`, `GET /bots/:id/config`, `GET /bots/:id/entities` (§4.5).

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use modbridge_core::repository::bot::BotRepository;
use modbridge_core::repository::entity::EntityRepository;
use modbridge_types::bot::BotConfig;
use modbridge_types::entity::Entity;
use modbridge_types::ids::{BotId, EntityGuid};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<BotId>>, AppError> {
    let ids = state.bots.list_active_ids().await?;
    Ok(Json(ids))
}

#[derive(Debug, Deserialize)]
pub struct ConfigQuery {
    #[serde(default)]
    force: Option<u8>,
}

/// `GET /bots/:id/config[?force=1]`. Refresh-rate-limited per §4.5/P9: a
/// non-forced call refreshes only if >=30 min since the last refresh; a
/// forced call only if >=60 s.
pub async fn get_config(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ConfigQuery>,
) -> Result<Json<BotConfig>, AppError> {
    let bot_id = BotId(id);
    let mut bot = state.bots.get(bot_id).await?.ok_or(AppError::NotFound)?;
    let forced = query.force.unwrap_or(0) == 1;

    let min_interval = if forced {
        state.refresh_throttle.forced_min_interval()
    } else {
        state.refresh_throttle.non_forced_min_interval()
    };

    let due_for_refresh = match bot.last_refreshed_at {
        None => true,
        Some(last) => {
            let elapsed = Utc::now().signed_duration_since(last).to_std().unwrap_or_default();
            elapsed >= min_interval
        }
    };

    if due_for_refresh {
        let access_token = state.auth_client.refresh_access_token(&bot.refresh_token).await?;
        let refreshed_at = Utc::now();
        state.bots.update_tokens(bot_id, &access_token, refreshed_at).await?;
        bot.access_token = access_token;
        bot.last_refreshed_at = Some(refreshed_at);
    }

    Ok(Json(BotConfig::from(&bot)))
}

pub async fn get_entities(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<HashMap<EntityGuid, Entity>>, AppError> {
    let entities = state.entities.active_for_bot(BotId(id)).await?;
    Ok(Json(entities))
}
