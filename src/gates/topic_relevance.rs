// src/gates/topic_relevance.rs
//! Topic relevance gate: flattened keyword lexicon scan over title + content.

use crate::article::{Article, GateCheckResult};
use crate::config::GateConfig;
use crate::gates::Gate;
use crate::keywords::match_keywords;

/// Max matched keywords quoted in the pass reason.
const REASON_SAMPLE: usize = 5;

pub struct TopicRelevanceGate {
    min_matches: usize,
}

impl TopicRelevanceGate {
    pub const NAME: &'static str = "topic_relevance";

    pub fn new(config: &GateConfig) -> Self {
        Self {
            min_matches: config.min_keyword_matches,
        }
    }
}

impl Gate for TopicRelevanceGate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, article: &Article) -> GateCheckResult {
        let full_text = format!("{} {}", article.title, article.content);
        let matched = match_keywords(&full_text);

        if matched.len() < self.min_matches {
            return GateCheckResult::new(
                article,
                Self::NAME,
                false,
                format!(
                    "Insufficient keyword matches: {} < {}",
                    matched.len(),
                    self.min_matches
                ),
            );
        }

        let sample = matched
            .iter()
            .take(REASON_SAMPLE)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        GateCheckResult::new(
            article,
            Self::NAME,
            true,
            format!("Found {} relevant keywords (e.g., {sample})", matched.len()),
        )
    }
}
