// src/keywords.rs
//! Topic keyword lexicon for the relevance gate, bundled as a JSON asset and
//! flattened once at first use.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Keywords per topic category, keyed by the category's wire spelling
/// ("economy", "politics", "security", "energy", "international", "monetary").
pub static TOPIC_KEYWORDS: Lazy<HashMap<String, Vec<String>>> = Lazy::new(|| {
    let raw = include_str!("../topic_keywords.json");
    serde_json::from_str::<HashMap<String, Vec<String>>>(raw).expect("valid topic keyword lexicon")
});

/// All keywords across categories, lowercased, deduplicated, deterministic
/// order. Used for the flattened substring scan in the relevance gate.
pub static ALL_KEYWORDS: Lazy<Vec<String>> = Lazy::new(|| {
    let mut set = std::collections::BTreeSet::new();
    for list in TOPIC_KEYWORDS.values() {
        for kw in list {
            set.insert(kw.to_lowercase());
        }
    }
    set.into_iter().collect()
});

/// Count distinct keyword hits in `text` (case-insensitive substring match).
/// Returns the matched keywords in lexicon order.
pub fn match_keywords(text: &str) -> Vec<&'static str> {
    let haystack = text.to_lowercase();
    ALL_KEYWORDS
        .iter()
        .filter(|kw| haystack.contains(kw.as_str()))
        .map(|kw| kw.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_has_six_categories() {
        assert_eq!(TOPIC_KEYWORDS.len(), 6);
        assert!(TOPIC_KEYWORDS.contains_key("energy"));
    }

    #[test]
    fn flattened_lexicon_dedups_across_categories() {
        // "exportación" appears under both economy and international
        let n = ALL_KEYWORDS
            .iter()
            .filter(|k| k.as_str() == "exportación")
            .count();
        assert_eq!(n, 1);
    }

    #[test]
    fn matching_is_case_insensitive_and_distinct() {
        let matched = match_keywords("ECOPETROL y el GOBIERNO hablan de Ecopetrol");
        assert!(matched.contains(&"ecopetrol"));
        assert!(matched.contains(&"gobierno"));
        assert_eq!(
            matched.iter().filter(|k| **k == "ecopetrol").count(),
            1,
            "hits are distinct keywords, not occurrences"
        );
    }
}
