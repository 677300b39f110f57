// src/gates/mod.rs
//! Admission gates: named, deterministic pass/fail checks run in a fixed
//! order. A failed check is a normal logged outcome, never an error.

pub mod content_quality;
pub mod duplicate_detection;
pub mod temporal_relevance;
pub mod topic_relevance;

use std::sync::Arc;

use tracing::info;

use crate::article::{Article, GateCheckResult};
use crate::config::GateConfig;
use crate::storage::CorpusStore;

pub use content_quality::ContentQualityGate;
pub use duplicate_detection::DuplicateDetectionGate;
pub use temporal_relevance::TemporalRelevanceGate;
pub use topic_relevance::TopicRelevanceGate;

/// One admission check. Implementations never mutate the article and never
/// fail with an error; the outcome is carried in the result record.
pub trait Gate: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, article: &Article) -> GateCheckResult;
}

/// Ordered set of gates. Ordering matters: cheap checks go before expensive
/// ones so fail-fast runs skip the costly work.
pub struct GatePipeline {
    gates: Vec<Box<dyn Gate>>,
}

impl GatePipeline {
    pub fn new(gates: Vec<Box<dyn Gate>>) -> Self {
        Self { gates }
    }

    /// Default wiring: content quality, topic relevance, optionally duplicate
    /// detection, temporal relevance. The dedup gate is off by default; its
    /// corpus scan is the one expensive check in the set.
    pub fn with_default_gates(config: &GateConfig, corpus: Arc<dyn CorpusStore>) -> Self {
        let mut gates: Vec<Box<dyn Gate>> = vec![
            Box::new(ContentQualityGate::new(config)),
            Box::new(TopicRelevanceGate::new(config)),
        ];
        if config.enable_duplicate_gate {
            gates.push(Box::new(DuplicateDetectionGate::new(config, corpus)));
        }
        gates.push(Box::new(TemporalRelevanceGate::new(config)));
        Self::new(gates)
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Fail-fast evaluation: stops at the first failing gate, so the result
    /// list is truncated at the failure.
    pub fn run(&self, article: &Article) -> (bool, Vec<GateCheckResult>) {
        let mut results = Vec::with_capacity(self.gates.len());
        for gate in &self.gates {
            let result = gate.check(article);
            let failed = !result.passed();
            results.push(result);
            if failed {
                let last = results.last().expect("just pushed");
                info!(
                    article_id = %article.article_id,
                    gate = %last.gate_name,
                    reason = %last.reason,
                    "article rejected"
                );
                return (false, results);
            }
        }
        info!(
            article_id = %article.article_id,
            gates = self.gates.len(),
            "article passed all gates"
        );
        (true, results)
    }

    /// Exhaustive evaluation for audit completeness: every gate runs
    /// regardless of earlier failures.
    pub fn run_all(&self, article: &Article) -> (bool, Vec<GateCheckResult>) {
        let mut all_passed = true;
        let mut results = Vec::with_capacity(self.gates.len());
        for gate in &self.gates {
            let result = gate.check(article);
            all_passed &= result.passed();
            results.push(result);
        }
        (all_passed, results)
    }
}
