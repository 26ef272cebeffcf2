//! Compile-time-style validation of banned-word shape (§4.3 M3).
//!
//! Words are never interpreted as regex syntax -- every character is escaped
//! before compilation (see [`super::matcher`]) -- but malformed entries from
//! the data-plane (empty strings, control characters, runaway length) are
//! still rejected at the boundary rather than tolerated downstream.

use modbridge_types::error::ConfigMalformed;

const MAX_WORD_LEN: usize = 100;

/// `[Unicode-letter | Unicode-number | space | -_'.!?]{1,100}`
pub fn validate_word_shape(word: &str) -> Result<(), ConfigMalformed> {
    if word.is_empty() || word.chars().count() > MAX_WORD_LEN {
        return Err(ConfigMalformed {
            field: "custom_words".to_string(),
            reason: format!("word length must be 1..={MAX_WORD_LEN}, got {}", word.chars().count()),
        });
    }

    for c in word.chars() {
        let allowed = c.is_alphanumeric()
            || c == ' '
            || matches!(c, '-' | '_' | '\'' | '.' | '!' | '?');
        if !allowed {
            return Err(ConfigMalformed {
                field: "custom_words".to_string(),
                reason: format!("disallowed character '{c}' in word '{word}'"),
            });
        }
    }

    Ok(())
}

/// Filters a raw word list down to the subset that passes [`validate_word_shape`],
/// dropping (and letting the caller log) anything malformed rather than failing
/// the whole config load (§7 ConfigMalformed: substitute safe defaults).
pub fn filter_valid_words(words: &[String]) -> (Vec<String>, Vec<ConfigMalformed>) {
    let mut valid = Vec::with_capacity(words.len());
    let mut rejected = Vec::new();
    for word in words {
        match validate_word_shape(word) {
            Ok(()) => valid.push(word.clone()),
            Err(e) => rejected.push(e),
        }
    }
    (valid, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_words() {
        assert!(validate_word_shape("badword").is_ok());
        assert!(validate_word_shape("don't-do-that!").is_ok());
    }

    #[test]
    fn rejects_empty_and_overlong() {
        assert!(validate_word_shape("").is_err());
        assert!(validate_word_shape(&"a".repeat(101)).is_err());
    }

    #[test]
    fn rejects_disallowed_characters() {
        assert!(validate_word_shape("bad(word)").is_err());
        assert!(validate_word_shape("a.*b").is_err());
        assert!(validate_word_shape("nested((a+)+)").is_err());
    }

    #[test]
    fn filter_drops_only_malformed_entries() {
        let words = vec!["good".to_string(), "bad(word)".to_string(), "ok-one".to_string()];
        let (valid, rejected) = filter_valid_words(&words);
        assert_eq!(valid, vec!["good".to_string(), "ok-one".to_string()]);
        assert_eq!(rejected.len(), 1);
    }
}
