//! Maps upstream JIDs back to entity guids. Inbound stanzas are addressed by
//! JID; the worker's entity map, counters, and moderation state are keyed by
//! guid (§6 room identifier derivation).

use std::collections::HashMap;

use modbridge_types::ids::EntityGuid;

#[derive(Default)]
pub struct JidIndex {
    by_jid: HashMap<String, EntityGuid>,
    muc_jid: HashMap<EntityGuid, String>,
    presence_group: HashMap<EntityGuid, String>,
}

/// Strips the resource part (`.../<resource>`) to get the bare JID an
/// occupant message or presence is addressed from.
pub fn bare_jid(jid: &str) -> &str {
    jid.split('/').next().unwrap_or(jid)
}

impl JidIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_muc_jid(&mut self, guid: EntityGuid, muc_jid: String) {
        self.by_jid.insert(muc_jid.clone(), guid.clone());
        self.muc_jid.insert(guid, muc_jid);
    }

    pub fn register_presence_group(&mut self, guid: EntityGuid, presence_group: String) {
        self.by_jid.insert(presence_group.clone(), guid.clone());
        self.presence_group.insert(guid, presence_group);
    }

    pub fn lookup(&self, jid: &str) -> Option<&EntityGuid> {
        self.by_jid.get(bare_jid(jid))
    }

    pub fn muc_jid_of(&self, guid: &EntityGuid) -> Option<&str> {
        self.muc_jid.get(guid).map(String::as_str)
    }

    pub fn presence_group_of(&self, guid: &EntityGuid) -> Option<&str> {
        self.presence_group.get(guid).map(String::as_str)
    }

    /// Drop every jid pointing at this entity (unassign, 404).
    pub fn forget(&mut self, guid: &EntityGuid) {
        if let Some(jid) = self.muc_jid.remove(guid) {
            self.by_jid.remove(&jid);
        }
        if let Some(jid) = self.presence_group.remove(guid) {
            self.by_jid.remove(&jid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_jid_strips_resource() {
        assert_eq!(bare_jid("room@muc/nick"), "room@muc");
        assert_eq!(bare_jid("room@muc"), "room@muc");
    }

    #[test]
    fn lookup_resolves_through_resource() {
        let mut idx = JidIndex::new();
        let guid = EntityGuid::from("e1");
        idx.register_muc_jid(guid.clone(), "club-e1-general@muc".to_string());
        assert_eq!(idx.lookup("club-e1-general@muc/somebody"), Some(&guid));
    }

    #[test]
    fn forget_removes_both_jids() {
        let mut idx = JidIndex::new();
        let guid = EntityGuid::from("e1");
        idx.register_muc_jid(guid.clone(), "muc-jid".to_string());
        idx.register_presence_group(guid.clone(), "pg-jid".to_string());
        idx.forget(&guid);
        assert!(idx.lookup("muc-jid").is_none());
        assert!(idx.lookup("pg-jid").is_none());
    }
}
