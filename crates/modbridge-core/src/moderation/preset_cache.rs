//! Reference-counted preset cache (§3 I6, §4.3 M1, §8 P5).
//!
//! A preset is kept cached iff at least one live entity's moderation config
//! references it. Each call to [`PresetCache::acquire`] must be paired with
//! exactly one [`PresetCache::release`] when the referencing entity is
//! unassigned or reconfigured to point elsewhere.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use modbridge_types::ids::PresetId;
use modbridge_types::profanity::Preset;

struct Entry {
    preset: Arc<Preset>,
    refcount: usize,
}

#[derive(Default)]
pub struct PresetCache {
    entries: Mutex<HashMap<PresetId, Entry>>,
}

impl PresetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or bump the refcount of) a preset. Call once per entity that
    /// starts referencing `preset.id`.
    pub fn acquire(&self, preset: Preset) -> Arc<Preset> {
        let mut entries = self.entries.lock().expect("preset cache lock poisoned");
        match entries.get_mut(&preset.id) {
            Some(entry) => {
                entry.refcount += 1;
                entry.preset.clone()
            }
            None => {
                let preset = Arc::new(preset);
                entries.insert(
                    preset.id,
                    Entry {
                        preset: preset.clone(),
                        refcount: 1,
                    },
                );
                preset
            }
        }
    }

    /// Release one reference. Drops the preset entirely once the refcount
    /// reaches zero (M1).
    pub fn release(&self, id: PresetId) {
        let mut entries = self.entries.lock().expect("preset cache lock poisoned");
        let Some(entry) = entries.get_mut(&id) else {
            return;
        };
        entry.refcount = entry.refcount.saturating_sub(1);
        if entry.refcount == 0 {
            entries.remove(&id);
        }
    }

    /// Replace a cached preset's contents in place (`/refresh-preset/:id`),
    /// preserving its refcount. No-op if nothing currently references it.
    pub fn replace(&self, preset: Preset) {
        let mut entries = self.entries.lock().expect("preset cache lock poisoned");
        if let Some(entry) = entries.get_mut(&preset.id) {
            entry.preset = Arc::new(preset);
        }
    }

    pub fn get(&self, id: PresetId) -> Option<Arc<Preset>> {
        self.entries
            .lock()
            .expect("preset cache lock poisoned")
            .get(&id)
            .map(|e| e.preset.clone())
    }

    pub fn contains(&self, id: PresetId) -> bool {
        self.entries.lock().expect("preset cache lock poisoned").contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("preset cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(id: i64) -> Preset {
        Preset {
            id: PresetId(id),
            name: "default".into(),
            language: "en".into(),
            words: vec!["badword".into()],
        }
    }

    #[test]
    fn acquire_then_release_drops_entry() {
        let cache = PresetCache::new();
        cache.acquire(preset(1));
        assert!(cache.contains(PresetId(1)));
        cache.release(PresetId(1));
        assert!(!cache.contains(PresetId(1)));
    }

    #[test]
    fn shared_preset_survives_partial_release() {
        let cache = PresetCache::new();
        cache.acquire(preset(1));
        cache.acquire(preset(1));
        cache.release(PresetId(1));
        assert!(cache.contains(PresetId(1)), "still one referencing entity");
        cache.release(PresetId(1));
        assert!(!cache.contains(PresetId(1)));
    }

    #[test]
    fn release_on_absent_preset_is_a_noop() {
        let cache = PresetCache::new();
        cache.release(PresetId(99));
        assert!(cache.is_empty());
    }

    #[test]
    fn replace_preserves_refcount() {
        let cache = PresetCache::new();
        cache.acquire(preset(1));
        cache.acquire(preset(1));
        let mut updated = preset(1);
        updated.words = vec!["newword".into()];
        cache.replace(updated);
        assert_eq!(cache.get(PresetId(1)).unwrap().words, vec!["newword".to_string()]);
        cache.release(PresetId(1));
        assert!(cache.contains(PresetId(1)));
        cache.release(PresetId(1));
        assert!(!cache.contains(PresetId(1)));
    }
}
