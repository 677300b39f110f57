// src/chain/types.rs
//! Stage outputs, the per-article working state, and the finalized record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Pricing;
use crate::cost::cost_for;
use crate::dates::date_partition;
use crate::ranking::{RankingCategory, Score, TraderAction};

/// The four ordered enrichment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    Summarization,
    TopicExtraction,
    ImpactAnalysis,
    Ranking,
}

impl ProcessingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarization => "summarization",
            Self::TopicExtraction => "topic_extraction",
            Self::ImpactAnalysis => "impact_analysis",
            Self::Ranking => "ranking",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic categories for news classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicCategory {
    Economy,
    Politics,
    Security,
    Energy,
    International,
    Monetary,
    Other,
}

impl TopicCategory {
    /// Parse the wire spelling. Unrecognized values yield `None`; the caller
    /// decides whether to drop or default.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "economy" => Some(Self::Economy),
            "politics" => Some(Self::Politics),
            "security" => Some(Self::Security),
            "energy" => Some(Self::Energy),
            "international" => Some(Self::International),
            "monetary" => Some(Self::Monetary),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::Politics => "politics",
            Self::Security => "security",
            Self::Energy => "energy",
            Self::International => "international",
            Self::Monetary => "monetary",
            Self::Other => "other",
        }
    }
}

/// Direction of impact on the USD/COP exchange rate. POSITIVE strengthens
/// the peso (USD/COP down), NEGATIVE weakens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImpactDirection {
    Positive,
    Negative,
    Neutral,
}

impl ImpactDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "POSITIVE" => Some(Self::Positive),
            "NEGATIVE" => Some(Self::Negative),
            "NEUTRAL" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeHorizon {
    #[serde(rename = "short-term")]
    ShortTerm,
    #[serde(rename = "medium-term")]
    MediumTerm,
    #[serde(rename = "long-term")]
    LongTerm,
}

impl TimeHorizon {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "short-term" => Some(Self::ShortTerm),
            "medium-term" => Some(Self::MediumTerm),
            "long-term" => Some(Self::LongTerm),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short-term",
            Self::MediumTerm => "medium-term",
            Self::LongTerm => "long-term",
        }
    }
}

// ---- Stage outputs ----

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryOutput {
    pub summary: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicOutput {
    pub topics: Vec<TopicCategory>,
    pub reasoning: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactOutput {
    pub direction: ImpactDirection,
    pub mechanisms: Vec<String>,
    pub confidence: f64,
    pub time_horizon: TimeHorizon,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingOutput {
    pub score: Score,
    pub category: RankingCategory,
    pub justification: String,
    pub trader_action: TraderAction,
    pub reasoning: String,
}

/// Token and wall-clock accounting for a single stage call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub elapsed_ms: u64,
}

/// Per-article working record. Stage outputs land additively in order 1..4;
/// the state is discarded wholesale when any stage fails.
#[derive(Debug, Clone)]
pub struct EnrichmentState {
    pub article_id: String,
    pub started_at: DateTime<Utc>,
    pub summary: Option<SummaryOutput>,
    pub topics: Option<TopicOutput>,
    pub impact: Option<ImpactOutput>,
    pub ranking: Option<RankingOutput>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub processing_time_ms: u64,
}

impl EnrichmentState {
    pub fn new(article_id: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            started_at: Utc::now(),
            summary: None,
            topics: None,
            impact: None,
            ranking: None,
            input_tokens: 0,
            output_tokens: 0,
            processing_time_ms: 0,
        }
    }

    pub fn record_usage(&mut self, usage: StageUsage) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
        self.processing_time_ms += usage.elapsed_ms;
    }

    /// Seal the state into an immutable record. Returns `None` unless all
    /// four stages are present; partial states are never persisted.
    pub fn finalize(self, pricing: &Pricing) -> Option<ProcessedArticle> {
        let summary = self.summary?;
        let topics = self.topics?;
        let impact = self.impact?;
        let ranking = self.ranking?;
        let processed_at = Utc::now();
        let cost_usd = cost_for(self.input_tokens, self.output_tokens, pricing);
        Some(ProcessedArticle {
            article_id: self.article_id,
            summary: summary.summary,
            summary_reasoning: summary.reasoning,
            topics: topics.topics,
            topics_reasoning: topics.reasoning,
            topics_confidence: topics.confidence,
            impact_direction: impact.direction,
            impact_mechanisms: impact.mechanisms,
            impact_confidence: impact.confidence,
            impact_time_horizon: impact.time_horizon,
            impact_reasoning: impact.reasoning,
            ranking_score: ranking.score,
            ranking_category: ranking.category,
            ranking_justification: ranking.justification,
            trader_action: ranking.trader_action,
            ranking_reasoning: ranking.reasoning,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            processing_time_ms: self.processing_time_ms,
            cost_usd,
            processed_at,
            date_partition: date_partition(processed_at),
        })
    }
}

/// Finalized enrichment record: the union of the four stage outputs plus
/// aggregate accounting. Created only on full chain success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedArticle {
    pub article_id: String,

    pub summary: String,
    pub summary_reasoning: String,

    pub topics: Vec<TopicCategory>,
    pub topics_reasoning: String,
    pub topics_confidence: f64,

    pub impact_direction: ImpactDirection,
    pub impact_mechanisms: Vec<String>,
    pub impact_confidence: f64,
    pub impact_time_horizon: TimeHorizon,
    pub impact_reasoning: String,

    pub ranking_score: Score,
    pub ranking_category: RankingCategory,
    pub ranking_justification: String,
    pub trader_action: TraderAction,
    pub ranking_reasoning: String,

    pub input_tokens: u64,
    pub output_tokens: u64,
    pub processing_time_ms: u64,
    pub cost_usd: f64,
    pub processed_at: DateTime<Utc>,
    pub date_partition: String,
}

impl ProcessedArticle {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_wire_spellings_round_trip() {
        assert_eq!(
            serde_json::to_value(TopicCategory::Monetary).unwrap(),
            serde_json::json!("monetary")
        );
        assert_eq!(
            serde_json::to_value(ImpactDirection::Negative).unwrap(),
            serde_json::json!("NEGATIVE")
        );
        assert_eq!(
            serde_json::to_value(TimeHorizon::ShortTerm).unwrap(),
            serde_json::json!("short-term")
        );
        assert_eq!(TopicCategory::parse("ENERGY"), Some(TopicCategory::Energy));
        assert_eq!(TopicCategory::parse("deportes"), None);
        assert_eq!(TimeHorizon::parse("long-term"), Some(TimeHorizon::LongTerm));
    }

    #[test]
    fn finalize_requires_all_four_stages() {
        let pricing = Pricing::default();
        let mut state = EnrichmentState::new("a-1");
        state.summary = Some(SummaryOutput {
            summary: "resumen".into(),
            reasoning: "r".into(),
        });
        // stages 2..4 missing
        assert!(state.clone().finalize(&pricing).is_none());
    }

    #[test]
    fn usage_accumulates_additively() {
        let mut state = EnrichmentState::new("a-1");
        state.record_usage(StageUsage {
            input_tokens: 100,
            output_tokens: 40,
            elapsed_ms: 10,
        });
        state.record_usage(StageUsage {
            input_tokens: 50,
            output_tokens: 20,
            elapsed_ms: 5,
        });
        assert_eq!(state.input_tokens, 150);
        assert_eq!(state.output_tokens, 60);
        assert_eq!(state.processing_time_ms, 15);
    }
}
