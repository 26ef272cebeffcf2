//! A chat room ("entity") owned by a bot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::command_timer::{Command, Timer};
use crate::ids::EntityGuid;

/// The upstream room shape. `Community` entities are standalone; `Chat` and
/// `Ihl` entities are channels scoped within a parent community (I4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Community,
    Chat,
    Ihl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Inactive,
}

/// A room as stored by the data-plane, and as shipped to workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub guid: EntityGuid,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Required when `entity_type` is `Chat` or `Ihl` (I4).
    pub parent_guid: Option<EntityGuid>,
    pub status: EntityStatus,
    pub name: String,
    /// Trigger (lowercased) -> command.
    pub commands: HashMap<String, Command>,
    /// Round-robin rotation, in order.
    pub timers: Vec<Timer>,
    pub timer_counter_max: u32,
    pub read_only: bool,
    pub welcome_message: Option<String>,
}

impl Entity {
    /// I4: chat/ihl entities must carry a parent guid.
    pub fn validate(&self) -> Result<(), String> {
        let needs_parent = matches!(self.entity_type, EntityType::Chat | EntityType::Ihl);
        if needs_parent && self.parent_guid.is_none() {
            return Err(format!(
                "entity {} of type {:?} is missing a parent guid",
                self.guid, self.entity_type
            ));
        }
        Ok(())
    }

    /// The guid used to address club-scoped upstream resources (mute target,
    /// supergroup base): the parent for chat/ihl, self otherwise.
    pub fn club_guid(&self) -> &EntityGuid {
        match self.entity_type {
            EntityType::Community => &self.guid,
            EntityType::Chat | EntityType::Ihl => {
                self.parent_guid.as_ref().unwrap_or(&self.guid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(entity_type: EntityType, parent: Option<&str>) -> Entity {
        Entity {
            guid: EntityGuid::from("e1"),
            entity_type,
            parent_guid: parent.map(EntityGuid::from),
            status: EntityStatus::Active,
            name: "room".into(),
            commands: HashMap::new(),
            timers: Vec::new(),
            timer_counter_max: 10,
            read_only: false,
            welcome_message: None,
        }
    }

    #[test]
    fn community_needs_no_parent() {
        assert!(base(EntityType::Community, None).validate().is_ok());
    }

    #[test]
    fn chat_requires_parent() {
        assert!(base(EntityType::Chat, None).validate().is_err());
        assert!(base(EntityType::Chat, Some("p1")).validate().is_ok());
    }

    #[test]
    fn club_guid_uses_parent_for_channels() {
        let e = base(EntityType::Chat, Some("p1"));
        assert_eq!(e.club_guid(), &EntityGuid::from("p1"));
        let e = base(EntityType::Community, None);
        assert_eq!(e.club_guid(), &EntityGuid::from("e1"));
    }
}
