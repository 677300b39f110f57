// src/article.rs
//! Raw article records and the append-only gate audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::dates::date_partition;

/// A scraped news article. Immutable once built; gates and the enrichment
/// chain only ever read it. `content_length` counts characters, not bytes,
/// so accented Spanish text measures the same as its plain-ASCII length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub article_id: String,
    pub url: String,
    pub source: String,
    pub title: String,
    pub content: String,
    pub scraped_at: DateTime<Utc>,
    pub content_length: usize,
    pub content_hash: String,
    pub date_partition: String,
}

impl Article {
    /// Build an article, deriving length, content hash and partition key.
    pub fn new(
        article_id: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        let content = content.into();
        let content_length = content.chars().count();
        let content_hash = hash_content(&content);
        Self {
            article_id: article_id.into(),
            url: url.into(),
            source: source.into(),
            title: title.into(),
            content,
            scraped_at,
            content_length,
            content_hash,
            date_partition: date_partition(scraped_at),
        }
    }
}

/// SHA-256 hex digest of article content, used for exact-duplicate lookups.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateOutcome {
    Pass,
    Fail,
}

/// One gate evaluation on one article. Append-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateCheckResult {
    pub article_id: String,
    pub gate_name: String,
    pub outcome: GateOutcome,
    pub reason: String,
    pub checked_at: DateTime<Utc>,
    pub date_partition: String,
}

impl GateCheckResult {
    pub fn new(
        article: &Article,
        gate_name: &str,
        passed: bool,
        reason: impl Into<String>,
    ) -> Self {
        let checked_at = Utc::now();
        Self {
            article_id: article.article_id.clone(),
            gate_name: gate_name.to_string(),
            outcome: if passed {
                GateOutcome::Pass
            } else {
                GateOutcome::Fail
            },
            reason: reason.into(),
            checked_at,
            date_partition: date_partition(checked_at),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == GateOutcome::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Article {
        Article::new(
            "a-1",
            "https://cnn.example/2025/06/01/petroleo",
            "CNN_Colombia",
            "Ecopetrol aumenta producción",
            "El petróleo sube y Ecopetrol reporta mayor producción de crudo.",
            Utc::now(),
        )
    }

    #[test]
    fn derived_fields_are_computed() {
        let a = sample();
        assert_eq!(a.content_length, a.content.chars().count());
        // accented content: char count is below the byte count
        assert!(a.content_length < a.content.len());
        assert_eq!(a.content_hash.len(), 64);
        assert_eq!(a.date_partition, date_partition(a.scraped_at));
    }

    #[test]
    fn identical_content_hashes_identically() {
        let a = sample();
        let b = Article::new("a-2", "u", "s", "t", a.content.clone(), Utc::now());
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn gate_result_serializes_outcome_uppercase() {
        let a = sample();
        let r = GateCheckResult::new(&a, "content_quality", true, "ok");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["outcome"], serde_json::json!("PASS"));
        assert!(r.passed());
    }
}
