// src/pipeline.rs
//! Per-run orchestration: admit articles through the gates, enrich the
//! admitted ones, account successful chains. Chain failures are isolated per
//! article; a single failure never aborts the run.

use std::collections::BTreeMap;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{error, info};

use crate::article::{Article, GateCheckResult};
use crate::chain::{ChainExecutor, ProcessedArticle};
use crate::cost::CostTracker;
use crate::gates::GatePipeline;
use crate::market::MarketSnapshot;

/// One-time metrics registration (so series show up on the exporter side).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("gate_failures_total", "Articles rejected by a gate.");
        describe_counter!("gate_admitted_total", "Articles that passed all gates.");
        describe_counter!("chain_completed_total", "Articles fully enriched.");
        describe_counter!("chain_failures_total", "Chains aborted by a stage failure.");
        describe_counter!(
            "cost_threshold_exceeded_total",
            "Runs in which the cost threshold check tripped."
        );
    });
}

/// Run-level accounting. Gate failures (by gate name) and chain failures are
/// reported distinctly, never merged into a generic error count.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RunSummary {
    pub articles_checked: usize,
    pub articles_admitted: usize,
    pub articles_processed: usize,
    pub chain_failures: usize,
    pub gate_failures: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn gate_failures_total(&self) -> usize {
        self.gate_failures.values().sum()
    }
}

/// Run the fail-fast gate pipeline over each article. Returns the admitted
/// articles plus the complete ordered audit trail and per-gate failure
/// counts.
pub fn admit(
    articles: &[Article],
    gates: &GatePipeline,
    summary: &mut RunSummary,
) -> (Vec<Article>, Vec<GateCheckResult>) {
    ensure_metrics_described();

    let mut admitted = Vec::new();
    let mut audit = Vec::new();

    for article in articles {
        summary.articles_checked += 1;
        let (passed, results) = gates.run(article);
        if passed {
            summary.articles_admitted += 1;
            counter!("gate_admitted_total").increment(1);
            admitted.push(article.clone());
        } else if let Some(last) = results.last() {
            *summary
                .gate_failures
                .entry(last.gate_name.clone())
                .or_insert(0) += 1;
            counter!("gate_failures_total", "gate" => last.gate_name.clone()).increment(1);
        }
        audit.extend(results);
    }

    info!(
        checked = summary.articles_checked,
        admitted = summary.articles_admitted,
        "gate phase finished"
    );
    (admitted, audit)
}

/// Run the enrichment chain over each admitted article. A failed chain is
/// logged and skipped; successful chains are appended to the cost tracker.
pub async fn enrich(
    articles: &[Article],
    executor: &ChainExecutor,
    snapshot: &MarketSnapshot,
    tracker: &mut CostTracker,
    summary: &mut RunSummary,
) -> Vec<ProcessedArticle> {
    ensure_metrics_described();

    let mut processed = Vec::new();
    for article in articles {
        match executor.execute(article, snapshot).await {
            Ok(record) => {
                tracker.record(&record);
                summary.articles_processed += 1;
                counter!("chain_completed_total").increment(1);
                processed.push(record);
            }
            Err(e) => {
                summary.chain_failures += 1;
                counter!("chain_failures_total").increment(1);
                error!(
                    article_id = %article.article_id,
                    stage = %e.stage(),
                    error = %e,
                    "chain aborted; continuing with next article"
                );
            }
        }
    }

    info!(
        processed = summary.articles_processed,
        failed = summary.chain_failures,
        total_cost_usd = tracker.total_cost_usd(),
        "enrichment phase finished"
    );
    processed
}
