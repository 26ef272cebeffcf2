//! Ownership and exemption relations.

use serde::{Deserialize, Serialize};

use crate::ids::{BotId, EntityGuid, UserGuid};

/// Drives which worker owns which entity. `entity_guid` is unique (I2):
/// an entity is owned by at most one bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotEntityRelation {
    pub entity_guid: EntityGuid,
    pub bot_id: BotId,
}

/// A per-entity moderation exemption for a user guid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRelation {
    pub entity_guid: EntityGuid,
    pub user_guid: UserGuid,
}
