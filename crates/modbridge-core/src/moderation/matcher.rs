//! Evasion-tolerant banned-word matching with a compiled-pattern cache.
//!
//! Priority order (§4.3 Stage A.4): exact word-boundary match first, then a
//! set of evasion variants (whitespace-separated letters, dot-separated
//! letters, vowels replaced by `*`, basic leet substitution).

use std::sync::Arc;

use dashmap::DashMap;
use regex::Regex;

/// All compiled variants for one banned word, lowercased.
pub struct WordMatcher {
    exact: Regex,
    evasions: Vec<Regex>,
}

impl WordMatcher {
    pub fn compile(word: &str) -> Self {
        let word = word.to_lowercase();
        Self {
            exact: exact_pattern(&word),
            evasions: vec![
                spaced_pattern(&word, r"\s*"),
                spaced_pattern(&word, r"\.?\s*"),
                vowel_star_pattern(&word),
                leet_pattern(&word),
            ],
        }
    }

    /// Returns `true` if `text` (expected lowercased) contains this word,
    /// exactly or via any evasion variant.
    pub fn is_match(&self, text: &str) -> bool {
        self.exact.is_match(text) || self.evasions.iter().any(|re| re.is_match(text))
    }

    /// Whether the hit was an exact match (highest priority) as opposed to
    /// an evasion variant -- exposed for diagnostics/tests only.
    pub fn is_exact_match(&self, text: &str) -> bool {
        self.exact.is_match(text)
    }
}

fn exact_pattern(word: &str) -> Regex {
    let escaped = regex::escape(word);
    Regex::new(&format!(r"(?i)\b{escaped}\b")).expect("exact pattern always compiles")
}

/// Letters of `word` joined by `sep`, each letter escaped individually so the
/// word itself can never smuggle regex metacharacters through.
fn spaced_pattern(word: &str, sep: &str) -> Regex {
    let parts: Vec<String> = word.chars().map(|c| regex::escape(&c.to_string())).collect();
    let body = parts.join(sep);
    Regex::new(&format!(r"(?i){body}")).unwrap_or_else(|_| Regex::new(r"^\x00never-matches\x00$").unwrap())
}

/// Vowels in `word` become a class matching themselves or a literal `*`.
fn vowel_star_pattern(word: &str) -> Regex {
    let mut body = String::new();
    for c in word.chars() {
        if matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u') {
            body.push_str("[*aeiou]");
        } else {
            body.push_str(&regex::escape(&c.to_string()));
        }
    }
    Regex::new(&format!(r"(?i){body}")).unwrap_or_else(|_| Regex::new(r"^\x00never-matches\x00$").unwrap())
}

/// a->4, e->3, i->1, o->0, s->5: each substitutable letter becomes a class
/// matching either the letter or its leet digit.
fn leet_pattern(word: &str) -> Regex {
    let mut body = String::new();
    for c in word.chars() {
        let class = match c.to_ascii_lowercase() {
            'a' => Some("[a4]"),
            'e' => Some("[e3]"),
            'i' => Some("[i1]"),
            'o' => Some("[o0]"),
            's' => Some("[s5]"),
            _ => None,
        };
        match class {
            Some(c) => body.push_str(c),
            None => body.push_str(&regex::escape(&c.to_string())),
        }
    }
    Regex::new(&format!(r"(?i){body}")).unwrap_or_else(|_| Regex::new(r"^\x00never-matches\x00$").unwrap())
}

/// Process-wide cache of compiled matchers, keyed by lowercased word.
/// Shared across entities and presets -- compilation only depends on the
/// word itself, never on which entity references it.
#[derive(Default)]
pub struct MatcherCache {
    inner: DashMap<String, Arc<WordMatcher>>,
}

impl MatcherCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&self, word: &str) -> Arc<WordMatcher> {
        let key = word.to_lowercase();
        if let Some(existing) = self.inner.get(&key) {
            return existing.clone();
        }
        let compiled = Arc::new(WordMatcher::compile(&key));
        self.inner.insert(key, compiled.clone());
        compiled
    }

    /// Drop cached patterns for these words (§4.3 M2: preset refresh must
    /// invalidate compiled caches).
    pub fn invalidate(&self, words: &[String]) {
        for word in words {
            self.inner.remove(&word.to_lowercase());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let m = WordMatcher::compile("badword");
        assert!(m.is_match("this is a badword here"));
        assert!(m.is_exact_match("this is a badword here"));
    }

    #[test]
    fn whitespace_evasion() {
        let m = WordMatcher::compile("badword");
        assert!(m.is_match("this is b a d w o r d indeed"));
        assert!(!m.is_exact_match("this is b a d w o r d indeed"));
    }

    #[test]
    fn dot_evasion() {
        let m = WordMatcher::compile("badword");
        assert!(m.is_match("b.a.d.w.o.r.d"));
    }

    #[test]
    fn vowel_star_evasion() {
        let m = WordMatcher::compile("badword");
        assert!(m.is_match("b*dw*rd"));
    }

    #[test]
    fn leet_evasion() {
        let m = WordMatcher::compile("badword");
        assert!(m.is_match("b4dw0rd"));
    }

    #[test]
    fn no_false_positive_on_unrelated_text() {
        let m = WordMatcher::compile("badword");
        assert!(!m.is_match("hello world, nothing to see here"));
    }

    #[test]
    fn word_boundary_prevents_substring_false_positive() {
        let m = WordMatcher::compile("ass");
        assert!(!m.is_exact_match("class assignment"));
    }

    #[test]
    fn cache_reuses_compiled_matcher() {
        let cache = MatcherCache::new();
        let a = cache.get_or_compile("badword");
        let b = cache.get_or_compile("BadWord");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_drops_entry() {
        let cache = MatcherCache::new();
        cache.get_or_compile("badword");
        assert_eq!(cache.len(), 1);
        cache.invalidate(&["badword".to_string()]);
        assert!(cache.is_empty());
    }

    #[test]
    fn user_supplied_word_cannot_inject_regex_metachars() {
        // Even though validate::validate_word_shape would reject this shape,
        // the matcher itself must never interpret word content as regex.
        let m = WordMatcher::compile("a.*b");
        assert!(m.is_match("a.*b"));
        assert!(!m.is_match("aXXXXXb"));
    }
}
