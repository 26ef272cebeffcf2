//! Room identifier derivation (§6): the only place that knows how an entity
//! guid maps onto the upstream's MUC-Light JID, supergroup base, and
//! presence-group addresses.

use modbridge_types::entity::{Entity, EntityType};
use modbridge_types::ids::EntityGuid;

/// MUC-Light JID used to address an entity directly (joins, configuration
/// queries, groupchat messages).
pub fn muc_light_jid(entity: &Entity, muc_domain: &str) -> String {
    match entity.entity_type {
        EntityType::Community => format!("club-{}-general@{muc_domain}", entity.guid),
        EntityType::Chat | EntityType::Ihl => {
            let parent = entity.parent_guid.as_ref().unwrap_or(&entity.guid);
            format!("club-{parent}-channel-{}@{muc_domain}", entity.guid)
        }
    }
}

/// Supergroup base JID an entity's channel lives under.
pub fn supergroup_base(entity: &Entity, supergroup_domain: &str) -> String {
    let base_guid: &EntityGuid = match entity.entity_type {
        EntityType::Community => &entity.guid,
        EntityType::Chat | EntityType::Ihl => entity.parent_guid.as_ref().unwrap_or(&entity.guid),
    };
    format!("club-{base_guid}@{supergroup_domain}")
}

/// Presence-group address to subscribe to for this entity, once the
/// supergroup base is known.
pub fn presence_group(entity: &Entity, supergroup_domain: &str) -> String {
    let base = supergroup_base(entity, supergroup_domain);
    match entity.entity_type {
        EntityType::Community => format!("{base}/general"),
        EntityType::Chat | EntityType::Ihl => format!("{base}/channel-{}", entity.guid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn entity(entity_type: EntityType, guid: &str, parent: Option<&str>) -> Entity {
        Entity {
            guid: EntityGuid::from(guid),
            entity_type,
            parent_guid: parent.map(EntityGuid::from),
            status: modbridge_types::entity::EntityStatus::Active,
            name: "room".into(),
            commands: HashMap::new(),
            timers: Vec::new(),
            timer_counter_max: 10,
            read_only: false,
            welcome_message: None,
        }
    }

    #[test]
    fn community_muc_light_jid() {
        let e = entity(EntityType::Community, "e1", None);
        assert_eq!(muc_light_jid(&e, "muc.example.com"), "club-e1-general@muc.example.com");
    }

    #[test]
    fn channel_muc_light_jid_uses_parent() {
        let e = entity(EntityType::Chat, "c1", Some("p1"));
        assert_eq!(muc_light_jid(&e, "muc.example.com"), "club-p1-channel-c1@muc.example.com");
    }

    #[test]
    fn community_presence_group() {
        let e = entity(EntityType::Community, "e1", None);
        assert_eq!(presence_group(&e, "sg.example.com"), "club-e1@sg.example.com/general");
    }

    #[test]
    fn channel_presence_group_uses_parent_base() {
        let e = entity(EntityType::Chat, "c1", Some("p1"));
        assert_eq!(presence_group(&e, "sg.example.com"), "club-p1@sg.example.com/channel-c1");
    }
}
