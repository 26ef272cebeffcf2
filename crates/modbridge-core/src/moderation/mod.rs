//! The moderation pipeline: banned-word matching, preset caching, read-only
//! enforcement, timer rotation, and command dispatch (§4.3).

pub mod matcher;
pub mod pipeline;
pub mod preset_cache;
pub mod validate;

pub use matcher::WordMatcher;
pub use pipeline::{evaluate, ModerationInput, PipelineAction};
pub use preset_cache::PresetCache;

use modbridge_types::profanity::Preset;

use validate::filter_valid_words;

/// Union of a preset's words and an entity's custom words, lowercased and
/// de-duplicated (§4.3 Stage A.3). Both sources pass through word-shape
/// validation (§4.3 M3) -- a preset is data-plane content like any other
/// and gets no exemption from the shape check custom words already get.
pub fn effective_words(preset: Option<&Preset>, custom_words: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    let preset_words = preset.map(|p| p.words.as_slice()).unwrap_or(&[]);
    let (valid_preset_words, rejected) = filter_valid_words(preset_words);
    for bad in &rejected {
        tracing::warn!(field = %bad.field, reason = %bad.reason, "rejected malformed preset word");
    }
    for word in valid_preset_words.iter().chain(custom_words.iter()) {
        let lowered = word.to_lowercase();
        if seen.insert(lowered.clone()) {
            out.push(lowered);
        }
    }
    out
}

#[cfg(test)]
mod effective_words_tests {
    use super::*;
    use modbridge_types::ids::PresetId;

    #[test]
    fn unions_and_dedupes_case_insensitively() {
        let preset = Preset {
            id: PresetId(1),
            name: "p".into(),
            language: "en".into(),
            words: vec!["Badword".into(), "shared".into()],
        };
        let custom = vec!["SHARED".to_string(), "custom".to_string()];
        let words = effective_words(Some(&preset), &custom);
        assert_eq!(words, vec!["badword".to_string(), "shared".to_string(), "custom".to_string()]);
    }

    #[test]
    fn no_preset_uses_only_custom_words() {
        let custom = vec!["custom".to_string()];
        let words = effective_words(None, &custom);
        assert_eq!(words, vec!["custom".to_string()]);
    }
}
