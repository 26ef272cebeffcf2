//! Per-entity moderation configuration and shared banned-word presets.

use serde::{Deserialize, Serialize};

use crate::ids::{EntityGuid, PresetId, UserGuid};

/// Per-entity moderation configuration, owned 1:1 by an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfanityConfig {
    pub entity_guid: EntityGuid,
    pub preset_id: Option<PresetId>,
    pub custom_words: Vec<String>,
    pub discord_webhook_url: Option<String>,
    pub custom_webhook_message: Option<String>,
    pub reply_message: Option<String>,
    /// 0 (or absent upstream) means "do not mute".
    pub mute_duration_seconds: u64,
    pub active: bool,
}

impl ProfanityConfig {
    pub fn mute_duration(&self) -> Option<std::time::Duration> {
        if self.mute_duration_seconds == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs(self.mute_duration_seconds))
        }
    }
}

/// `GET /profanity-filter-config/:entityId` response: the config plus the
/// resolved manager exemption list, so workers don't need a second round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfanityConfigExtended {
    #[serde(flatten)]
    pub config: ProfanityConfig,
    pub manager_guids: Vec<UserGuid>,
}

/// A shared banned-word preset, referenced by id from many entities' configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    pub language: String,
    pub words: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(mute_secs: u64) -> ProfanityConfig {
        ProfanityConfig {
            entity_guid: EntityGuid::from("e1"),
            preset_id: None,
            custom_words: Vec::new(),
            discord_webhook_url: None,
            custom_webhook_message: None,
            reply_message: None,
            mute_duration_seconds: mute_secs,
            active: true,
        }
    }

    #[test]
    fn zero_mute_duration_means_skip() {
        assert_eq!(cfg(0).mute_duration(), None);
    }

    #[test]
    fn nonzero_mute_duration_converts() {
        assert_eq!(cfg(30).mute_duration(), Some(std::time::Duration::from_secs(30)));
    }
}
