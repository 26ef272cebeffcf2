//! Per-entity moderation state: resolved profanity config, acquired preset,
//! and the effective word list fed to the pipeline (§4.3).

use std::sync::Arc;

use modbridge_core::moderation::{effective_words, validate::filter_valid_words};
use modbridge_infra::http::dataplane_client::DataPlaneClient;
use modbridge_types::ids::EntityGuid;
use modbridge_types::profanity::{Preset, ProfanityConfigExtended};

#[derive(Clone)]
pub struct EntityModeration {
    pub profanity: Option<ProfanityConfigExtended>,
    pub preset: Option<Arc<Preset>>,
    pub custom_words: Vec<String>,
    pub effective_words: Vec<String>,
}

impl EntityModeration {
    fn empty() -> Self {
        Self { profanity: None, preset: None, custom_words: Vec::new(), effective_words: Vec::new() }
    }
}

/// Fetch and assemble moderation state for one entity. Never fails the
/// caller: a data-plane error or malformed word produces an empty/filtered
/// config and is logged (§7 ConfigMalformed, DataPlaneUnreachable).
pub async fn load_entity_moderation(
    dataplane: &DataPlaneClient,
    preset_cache: &modbridge_core::moderation::PresetCache,
    guid: &EntityGuid,
) -> EntityModeration {
    let profanity = match dataplane.profanity_config(guid).await {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!(%guid, %err, "failed to fetch profanity config, moderation disabled for entity");
            return EntityModeration::empty();
        }
    };

    let (valid_words, rejected) = filter_valid_words(&profanity.config.custom_words);
    for bad in &rejected {
        tracing::warn!(%guid, field = %bad.field, reason = %bad.reason, "rejected malformed custom word");
    }

    let preset = match profanity.config.preset_id {
        Some(preset_id) => match dataplane.preset(preset_id).await {
            Ok(preset) => Some(preset_cache.acquire(preset)),
            Err(err) => {
                tracing::warn!(%guid, %err, "failed to fetch preset, proceeding with custom words only");
                None
            }
        },
        None => None,
    };

    let words = effective_words(preset.as_deref(), &valid_words);

    EntityModeration {
        profanity: Some(profanity),
        preset,
        custom_words: valid_words,
        effective_words: words,
    }
}

/// Recompute `effective_words` after `/refresh-preset/:id` replaces the
/// cached preset's contents in place (§6, §4.3 M2).
pub fn recompute_effective_words(state: &mut EntityModeration) {
    state.effective_words = effective_words(state.preset.as_deref(), &state.custom_words);
}

/// Release the preset this entity's moderation state was holding, if any
/// (M1: cache entries never outlive their last referencing entity).
pub fn release_entity_moderation(preset_cache: &modbridge_core::moderation::PresetCache, state: &EntityModeration) {
    if let Some(preset) = &state.preset {
        preset_cache.release(preset.id);
    }
}
