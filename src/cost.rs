// src/cost.rs
//! Token and cost accounting across one pipeline run.

use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chain::ProcessedArticle;
use crate::config::{CostConfig, Pricing};
use crate::dates::date_partition;

/// Linear per-token pricing, separate input/output rates per 1M tokens.
pub fn cost_for(input_tokens: u64, output_tokens: u64, pricing: &Pricing) -> f64 {
    let input_cost = (input_tokens as f64 / 1_000_000.0) * pricing.input_cost_per_1m;
    let output_cost = (output_tokens as f64 / 1_000_000.0) * pricing.output_cost_per_1m;
    input_cost + output_cost
}

/// One ledger entry per fully-chained article. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostRecord {
    pub article_id: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
    pub ranking_score: u8,
    pub processing_time_ms: u64,
}

/// Run-level aggregation. All averages are zero when no articles were
/// recorded; there is no division error path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CostReport {
    pub date: String,
    pub total_articles: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    pub avg_tokens_per_article: f64,
    pub avg_cost_per_article: f64,
    pub min_cost_article: f64,
    pub max_cost_article: f64,
    pub processing_time_ms: u64,
    pub records: Vec<CostRecord>,
}

/// Accumulates token usage and spend across chain completions within one
/// run. Appends are serialized by &mut; `reset` marks the run boundary.
#[derive(Debug, Default)]
pub struct CostTracker {
    pricing: Pricing,
    total_input_tokens: u64,
    total_output_tokens: u64,
    total_cost_usd: f64,
    records: Vec<CostRecord>,
}

impl CostTracker {
    pub fn new(pricing: &Pricing) -> Self {
        Self {
            pricing: pricing.clone(),
            ..Self::default()
        }
    }

    /// Append one completed article to the ledger and bump totals.
    pub fn record(&mut self, processed: &ProcessedArticle) {
        self.total_input_tokens += processed.input_tokens;
        self.total_output_tokens += processed.output_tokens;
        self.total_cost_usd += processed.cost_usd;
        self.records.push(CostRecord {
            article_id: processed.article_id.clone(),
            input_tokens: processed.input_tokens,
            output_tokens: processed.output_tokens,
            total_tokens: processed.total_tokens(),
            cost_usd: processed.cost_usd,
            ranking_score: processed.ranking_score.get(),
            processing_time_ms: processed.processing_time_ms,
        });
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }

    pub fn total_cost_usd(&self) -> f64 {
        self.total_cost_usd
    }

    pub fn articles_recorded(&self) -> usize {
        self.records.len()
    }

    pub fn average_cost_per_article(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.total_cost_usd / self.records.len() as f64
    }

    pub fn average_tokens_per_article(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.total_tokens() as f64 / self.records.len() as f64
    }

    /// Pure aggregation over the ledger. Empty tracker yields a zero-valued
    /// report.
    pub fn generate_report(&self, date: Option<String>) -> CostReport {
        let date = date.unwrap_or_else(|| date_partition(Utc::now()));

        if self.records.is_empty() {
            warn!("no articles tracked, returning empty report");
            return CostReport {
                date,
                ..CostReport::default()
            };
        }

        let min_cost = self
            .records
            .iter()
            .map(|r| r.cost_usd)
            .fold(f64::INFINITY, f64::min);
        let max_cost = self
            .records
            .iter()
            .map(|r| r.cost_usd)
            .fold(f64::NEG_INFINITY, f64::max);
        let processing_time_ms = self.records.iter().map(|r| r.processing_time_ms).sum();

        let report = CostReport {
            date,
            total_articles: self.records.len(),
            total_input_tokens: self.total_input_tokens,
            total_output_tokens: self.total_output_tokens,
            total_tokens: self.total_tokens(),
            total_cost_usd: self.total_cost_usd,
            avg_tokens_per_article: self.average_tokens_per_article(),
            avg_cost_per_article: self.average_cost_per_article(),
            min_cost_article: min_cost,
            max_cost_article: max_cost,
            processing_time_ms,
            records: self.records.clone(),
        };

        info!(
            articles = report.total_articles,
            total_cost_usd = report.total_cost_usd,
            avg_cost_per_article = report.avg_cost_per_article,
            "cost report generated"
        );
        report
    }

    /// Compare the running total against the configured daily limit. Always
    /// reports whether the limit was exceeded; the warn + counter emission is
    /// gated on `enable_cost_alerts`. Never halts processing either way.
    pub fn check_cost_threshold(&self, cost: &CostConfig) -> bool {
        if self.total_cost_usd > cost.daily_threshold_usd {
            if cost.enable_cost_alerts {
                warn!(
                    total_cost_usd = self.total_cost_usd,
                    threshold_usd = cost.daily_threshold_usd,
                    "cost threshold exceeded"
                );
                counter!("cost_threshold_exceeded_total").increment(1);
            }
            return true;
        }
        false
    }

    /// Run boundary: clears all accumulators.
    pub fn reset(&mut self) {
        self.total_input_tokens = 0;
        self.total_output_tokens = 0;
        self.total_cost_usd = 0.0;
        self.records.clear();
        info!("cost tracker reset");
    }
}
