// src/gates/duplicate_detection.rs
//! Duplicate detection gate: exact content-hash lookup, then a fuzzy title
//! scan over the current partition. O(corpus) per check, which is fine at a
//! single day's scale (~100 articles).

use std::sync::Arc;

use crate::article::{Article, GateCheckResult};
use crate::config::GateConfig;
use crate::gates::Gate;
use crate::storage::CorpusStore;

pub struct DuplicateDetectionGate {
    corpus: Arc<dyn CorpusStore>,
    threshold: f64,
}

impl DuplicateDetectionGate {
    pub const NAME: &'static str = "duplicate_detection";

    pub fn new(config: &GateConfig, corpus: Arc<dyn CorpusStore>) -> Self {
        Self {
            corpus,
            threshold: config.similarity_threshold,
        }
    }
}

impl Gate for DuplicateDetectionGate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, article: &Article) -> GateCheckResult {
        // Phase 1: exact content hash
        if self.corpus.hash_exists(&article.content_hash) {
            let prefix: String = article.content_hash.chars().take(8).collect();
            return GateCheckResult::new(
                article,
                Self::NAME,
                false,
                format!("Duplicate content hash: {prefix}..."),
            );
        }

        // Phase 2: fuzzy title match against existing titles
        let similar = self
            .corpus
            .find_similar_titles(&article.title, self.threshold);
        if let Some(first) = similar.first() {
            return GateCheckResult::new(
                article,
                Self::NAME,
                false,
                format!("Similar title found: '{first}'"),
            );
        }

        GateCheckResult::new(article, Self::NAME, true, "No duplicates detected")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryCorpus;
    use chrono::Utc;

    fn gate_with(corpus: InMemoryCorpus) -> DuplicateDetectionGate {
        DuplicateDetectionGate::new(&GateConfig::default(), Arc::new(corpus))
    }

    #[test]
    fn exact_hash_fails_before_title_scan() {
        let a = Article::new("a-1", "u", "s", "Titular nuevo", "cuerpo", Utc::now());
        let mut corpus = InMemoryCorpus::new();
        corpus.insert(a.content_hash.clone(), "Titular completamente distinto");
        let r = gate_with(corpus).check(&a);
        assert!(!r.passed());
        assert!(r.reason.contains("Duplicate content hash"));
    }

    #[test]
    fn fuzzy_title_fails_and_names_the_match() {
        let a = Article::new(
            "a-1",
            "u",
            "s",
            "El Gobierno anuncia la reforma tributaria",
            "cuerpo distinto",
            Utc::now(),
        );
        let mut corpus = InMemoryCorpus::new();
        corpus.insert("otherhash", "Gobierno anuncia reforma tributaria");
        let r = gate_with(corpus).check(&a);
        assert!(!r.passed());
        assert!(
            r.reason
                .contains("Gobierno anuncia reforma tributaria"),
            "reason: {}",
            r.reason
        );
    }

    #[test]
    fn fresh_article_passes() {
        let a = Article::new("a-1", "u", "s", "Titular nuevo", "cuerpo", Utc::now());
        let mut corpus = InMemoryCorpus::new();
        corpus.insert("otherhash", "Algo sobre el precio del café");
        let r = gate_with(corpus).check(&a);
        assert!(r.passed());
    }
}
