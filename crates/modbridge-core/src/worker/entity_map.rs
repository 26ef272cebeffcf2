//! A worker's in-memory entity set (§3 I5, §4.1.4, §4.1.5, §8 P8).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use modbridge_types::entity::Entity;
use modbridge_types::ids::EntityGuid;

pub struct EntityMap {
    entities: HashMap<EntityGuid, Entity>,
    /// Suppresses outgoing stanzas and re-assignment races for a window
    /// after an unassign (§4.1.4).
    recently_unassigned: HashMap<EntityGuid, Instant>,
    /// Suppresses outgoing stanzas indefinitely until an explicit `/assign`
    /// clears the entry (§4.1.5, P8).
    non_existent: std::collections::HashSet<EntityGuid>,
    debounce_window: Duration,
}

impl EntityMap {
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            entities: HashMap::new(),
            recently_unassigned: HashMap::new(),
            non_existent: std::collections::HashSet::new(),
            debounce_window,
        }
    }

    pub fn get(&self, guid: &EntityGuid) -> Option<&Entity> {
        self.entities.get(guid)
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntityGuid> {
        self.entities.keys()
    }

    pub fn contains(&self, guid: &EntityGuid) -> bool {
        self.entities.contains_key(guid)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Assignment: clears the non-existent and recently-unassigned flags and
    /// writes the entity's config into the map (§4.1.4).
    pub fn assign(&mut self, entity: Entity) {
        let guid = entity.guid.clone();
        self.non_existent.remove(&guid);
        self.recently_unassigned.remove(&guid);
        self.entities.insert(guid, entity);
    }

    /// Unassignment: removes the entity and starts the debounce window
    /// (§4.1.4). Does not touch the non-existent set -- those are distinct
    /// and longer-lived (§4.1.5).
    pub fn unassign(&mut self, guid: &EntityGuid, now: Instant) -> Option<Entity> {
        self.recently_unassigned.insert(guid.clone(), now);
        self.entities.remove(guid)
    }

    /// In-place overwrite for `old ∩ new` during reconciliation. No stanza
    /// is implied by this call (§4.1.4).
    pub fn update(&mut self, entity: Entity) {
        self.entities.insert(entity.guid.clone(), entity);
    }

    /// §4.1.5: an upstream 404 against a known entity.
    pub fn mark_non_existent(&mut self, guid: &EntityGuid) -> Option<Entity> {
        self.non_existent.insert(guid.clone());
        self.entities.remove(guid)
    }

    /// §8 P8: suppress every outgoing stanza addressed to a non-existent or
    /// still-debouncing entity.
    pub fn is_suppressed(&self, guid: &EntityGuid, now: Instant) -> bool {
        if self.non_existent.contains(guid) {
            return true;
        }
        match self.recently_unassigned.get(guid) {
            Some(unassigned_at) => now.duration_since(*unassigned_at) < self.debounce_window,
            None => false,
        }
    }

    /// Periodic cleanup: drop debounce entries whose window has elapsed.
    pub fn cleanup_expired_debounce(&mut self, now: Instant) {
        self.recently_unassigned
            .retain(|_, ts| now.duration_since(*ts) < self.debounce_window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modbridge_types::entity::EntityStatus;
    use std::collections::HashMap as StdHashMap;

    fn entity(guid: &str) -> Entity {
        Entity {
            guid: EntityGuid::from(guid),
            entity_type: modbridge_types::entity::EntityType::Community,
            parent_guid: None,
            status: EntityStatus::Active,
            name: "room".into(),
            commands: StdHashMap::new(),
            timers: Vec::new(),
            timer_counter_max: 10,
            read_only: false,
            welcome_message: None,
        }
    }

    #[test]
    fn assign_clears_non_existent_flag() {
        let mut map = EntityMap::new(Duration::from_secs(300));
        let guid = EntityGuid::from("e1");
        map.mark_non_existent(&guid);
        assert!(map.is_suppressed(&guid, Instant::now()));
        map.assign(entity("e1"));
        assert!(!map.is_suppressed(&guid, Instant::now()));
        assert!(map.contains(&guid));
    }

    #[test]
    fn unassign_suppresses_within_debounce_window() {
        let mut map = EntityMap::new(Duration::from_millis(50));
        let guid = EntityGuid::from("e1");
        map.assign(entity("e1"));
        let t0 = Instant::now();
        map.unassign(&guid, t0);
        assert!(map.is_suppressed(&guid, t0));
        assert!(!map.contains(&guid));
        std::thread::sleep(Duration::from_millis(60));
        assert!(!map.is_suppressed(&guid, Instant::now()));
    }

    #[test]
    fn non_existent_suppression_does_not_expire() {
        let mut map = EntityMap::new(Duration::from_millis(1));
        let guid = EntityGuid::from("e1");
        map.mark_non_existent(&guid);
        std::thread::sleep(Duration::from_millis(5));
        assert!(map.is_suppressed(&guid, Instant::now()));
    }

    #[test]
    fn cleanup_drops_expired_debounce_entries() {
        let mut map = EntityMap::new(Duration::from_millis(10));
        let guid = EntityGuid::from("e1");
        map.assign(entity("e1"));
        map.unassign(&guid, Instant::now());
        std::thread::sleep(Duration::from_millis(20));
        map.cleanup_expired_debounce(Instant::now());
        assert!(!map.is_suppressed(&guid, Instant::now()));
    }
}
