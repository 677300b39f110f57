// src/lib.rs
// Public library surface for integration tests (and the orchestration shell).

pub mod article;
pub mod config;
pub mod cost;
pub mod dates;
pub mod keywords;
pub mod market;
pub mod ranking;
pub mod similarity;
pub mod storage;

// Admission gates (content quality, topic relevance, dedup, temporal).
pub mod gates;

// 4-step enrichment chain backed by a text-generation provider.
pub mod chain;
pub mod llm;

// Per-run orchestration: admit -> enrich -> account.
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::article::{Article, GateCheckResult, GateOutcome};
pub use crate::chain::{ChainError, ChainExecutor, EnrichmentState, ProcessedArticle};
pub use crate::config::PipelineConfig;
pub use crate::cost::{CostReport, CostTracker};
pub use crate::gates::{Gate, GatePipeline};
pub use crate::llm::{Generation, GenerationRequest, TextGenerator};
pub use crate::market::{MarketIndicator, MarketSnapshot, MarketTier};
pub use crate::ranking::{RankingCategory, Score, TraderAction};
