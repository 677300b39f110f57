// src/gates/content_quality.rs
//! Content quality gate: length bounds, Spanish-marker ratio, and non-empty
//! title/content. Checks run in order; the first failure sets the reason.

use crate::article::{Article, GateCheckResult};
use crate::config::GateConfig;
use crate::gates::Gate;

/// Common Spanish words and suffixes used as a cheap language heuristic.
/// The trailing space on function words keeps them from matching inside
/// longer tokens.
const SPANISH_MARKERS: &[&str] = &[
    "el ", "la ", "los ", "las ", "de ", "del ", "en ", "y ", "que ", "es ", "un ", "una ",
    "por ", "para ", "con ", "gobierno", "presidente", "país", "economía", "colombia", "ación",
    "ción", "dad", "mente", "año", "más", "según",
];

pub struct ContentQualityGate {
    min_length: usize,
    max_length: usize,
    min_language_ratio: f64,
}

impl ContentQualityGate {
    pub const NAME: &'static str = "content_quality";

    pub fn new(config: &GateConfig) -> Self {
        Self {
            min_length: config.min_content_length,
            max_length: config.max_content_length,
            min_language_ratio: config.min_language_ratio,
        }
    }
}

/// Marker occurrences divided by word count, capped at 1.0. Zero words means
/// ratio 0.
pub fn spanish_ratio(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let words = lower.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }
    let hits: usize = SPANISH_MARKERS
        .iter()
        .map(|marker| lower.matches(marker).count())
        .sum();
    (hits as f64 / words as f64).min(1.0)
}

impl Gate for ContentQualityGate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, article: &Article) -> GateCheckResult {
        // bounds are in characters, so accents do not inflate the measure
        let len = article.content_length;
        if len < self.min_length {
            return GateCheckResult::new(
                article,
                Self::NAME,
                false,
                format!("Content too short: {len} < {} chars", self.min_length),
            );
        }
        if len > self.max_length {
            return GateCheckResult::new(
                article,
                Self::NAME,
                false,
                format!("Content too long: {len} > {} chars", self.max_length),
            );
        }

        let ratio = spanish_ratio(&article.content);
        if ratio < self.min_language_ratio {
            return GateCheckResult::new(
                article,
                Self::NAME,
                false,
                format!(
                    "Spanish ratio too low: {ratio:.2} < {:.2}",
                    self.min_language_ratio
                ),
            );
        }

        if article.title.trim().is_empty() {
            return GateCheckResult::new(article, Self::NAME, false, "Missing title");
        }
        if article.content.trim().is_empty() {
            return GateCheckResult::new(article, Self::NAME, false, "Missing content");
        }

        GateCheckResult::new(
            article,
            Self::NAME,
            true,
            format!("Quality checks passed (length: {len}, spanish: {ratio:.2})"),
        )
    }
}
