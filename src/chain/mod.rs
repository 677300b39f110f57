// src/chain/mod.rs
//! Enrichment chain executor: four strictly ordered stages (summarize,
//! classify topics, analyze impact, rank), each one prompt + one generation
//! call + structured parsing. Any stage failure aborts the whole chain for
//! that article; aborted token counts are discarded.

pub mod prompts;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};

use crate::article::Article;
use crate::config::{GeneratorConfig, Pricing};
use crate::llm::{parse_json_payload, GenerationRequest, TextGenerator};
use crate::market::MarketSnapshot;
use crate::ranking::{RankingCategory, Score, TraderAction};

pub use types::{
    EnrichmentState, ImpactDirection, ImpactOutput, ProcessedArticle, ProcessingStage,
    RankingOutput, StageUsage, SummaryOutput, TimeHorizon, TopicCategory, TopicOutput,
};

/// Chain failures, always scoped to a single article. Gate rejections are
/// not errors; these are.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// A stage response parsed but an essential field is missing or invalid.
    #[error("{stage} validation failed: {reason}")]
    Validation {
        stage: ProcessingStage,
        reason: String,
    },
    /// The text-generation collaborator was unreachable or returned an
    /// error. Never retried here.
    #[error("{stage} transport failure: {source}")]
    Transport {
        stage: ProcessingStage,
        #[source]
        source: anyhow::Error,
    },
}

impl ChainError {
    pub fn stage(&self) -> ProcessingStage {
        match self {
            Self::Validation { stage, .. } | Self::Transport { stage, .. } => *stage,
        }
    }
}

pub struct ChainExecutor {
    generator: Arc<dyn TextGenerator>,
    config: GeneratorConfig,
    pricing: Pricing,
}

impl ChainExecutor {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &GeneratorConfig, pricing: &Pricing) -> Self {
        Self {
            generator,
            config: config.clone(),
            pricing: pricing.clone(),
        }
    }

    /// One generation call: render -> generate -> parse JSON. Transport and
    /// parse failures are both fatal to the stage.
    async fn call_stage(
        &self,
        stage: ProcessingStage,
        prompt: &str,
    ) -> Result<(Value, StageUsage), ChainError> {
        let started = Instant::now();
        let generation = self
            .generator
            .generate(GenerationRequest {
                prompt,
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
                system: None,
            })
            .await
            .map_err(|source| ChainError::Transport { stage, source })?;

        let payload = parse_json_payload(&generation.text).map_err(|e| ChainError::Validation {
            stage,
            reason: e.to_string(),
        })?;

        let usage = StageUsage {
            input_tokens: generation.input_tokens,
            output_tokens: generation.output_tokens,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        Ok((payload, usage))
    }

    /// Stage 1: summarization. `summary` is essential.
    pub async fn summarize(
        &self,
        article: &Article,
    ) -> Result<(SummaryOutput, StageUsage), ChainError> {
        let stage = ProcessingStage::Summarization;
        let prompt = prompts::summarization(article);
        let (payload, usage) = self.call_stage(stage, &prompt).await?;

        let summary = payload["summary"].as_str().unwrap_or("").trim().to_string();
        if summary.chars().count() < 10 {
            return Err(ChainError::Validation {
                stage,
                reason: "summary is missing or shorter than 10 chars".into(),
            });
        }
        let output = SummaryOutput {
            summary,
            reasoning: str_field(&payload, "reasoning"),
        };
        info!(article_id = %article.article_id, stage = %stage, elapsed_ms = usage.elapsed_ms, "stage completed");
        Ok((output, usage))
    }

    /// Stage 2: topic extraction. Unrecognized topics are dropped, not
    /// fatal; an empty set after dropping collapses to `other`.
    pub async fn extract_topics(
        &self,
        article: &Article,
        summary: &str,
    ) -> Result<(TopicOutput, StageUsage), ChainError> {
        let stage = ProcessingStage::TopicExtraction;
        let prompt = prompts::topic_extraction(article, summary);
        let (payload, usage) = self.call_stage(stage, &prompt).await?;

        let mut topics = Vec::new();
        if let Some(raw) = payload["topics"].as_array() {
            for entry in raw {
                let Some(s) = entry.as_str() else { continue };
                match TopicCategory::parse(s) {
                    Some(t) => {
                        if !topics.contains(&t) {
                            topics.push(t);
                        }
                    }
                    None => {
                        warn!(article_id = %article.article_id, topic = %s, "unrecognized topic dropped");
                    }
                }
            }
        }
        if topics.is_empty() {
            topics.push(TopicCategory::Other);
        }

        let output = TopicOutput {
            topics,
            reasoning: str_field(&payload, "reasoning"),
            confidence: confidence_field(&payload),
        };
        info!(article_id = %article.article_id, stage = %stage, elapsed_ms = usage.elapsed_ms, topics = ?output.topics, "stage completed");
        Ok((output, usage))
    }

    /// Stage 3: impact analysis. `direction` is essential; an unrecognized
    /// time horizon falls back to medium-term.
    pub async fn analyze_impact(
        &self,
        article: &Article,
        summary: &str,
        topics: &[TopicCategory],
        snapshot: &MarketSnapshot,
    ) -> Result<(ImpactOutput, StageUsage), ChainError> {
        let stage = ProcessingStage::ImpactAnalysis;
        let prompt = prompts::impact_analysis(summary, topics, &snapshot.context_block());
        let (payload, usage) = self.call_stage(stage, &prompt).await?;

        let direction = payload["direction"]
            .as_str()
            .and_then(ImpactDirection::parse)
            .ok_or_else(|| ChainError::Validation {
                stage,
                reason: "direction is missing or unrecognized".into(),
            })?;

        let time_horizon = payload["time_horizon"]
            .as_str()
            .and_then(TimeHorizon::parse)
            .unwrap_or(TimeHorizon::MediumTerm);

        let mechanisms = payload["mechanisms"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let output = ImpactOutput {
            direction,
            mechanisms,
            confidence: confidence_field(&payload),
            time_horizon,
            reasoning: str_field(&payload, "reasoning"),
        };
        info!(
            article_id = %article.article_id,
            stage = %stage,
            elapsed_ms = usage.elapsed_ms,
            direction = %output.direction.as_str(),
            "stage completed"
        );
        Ok((output, usage))
    }

    /// Stage 4: ranking. The numeric score is essential and always wins:
    /// category and trader action are recomputed from it, and any declared
    /// category/action fields are ignored.
    pub async fn rank(
        &self,
        article: &Article,
        summary: &str,
        topics: &[TopicCategory],
        impact: &ImpactOutput,
    ) -> Result<(RankingOutput, StageUsage), ChainError> {
        let stage = ProcessingStage::Ranking;
        let prompt = prompts::ranking(summary, topics, impact);
        let (payload, usage) = self.call_stage(stage, &prompt).await?;

        let score = payload["score"]
            .as_i64()
            .and_then(Score::new)
            .ok_or_else(|| ChainError::Validation {
                stage,
                reason: "score is missing or outside 1..=5".into(),
            })?;

        let category = RankingCategory::from_score(score);
        if let Some(declared) = payload["category"].as_str() {
            if declared != category.as_str() {
                warn!(
                    article_id = %article.article_id,
                    declared,
                    derived = category.as_str(),
                    "declared category disagrees with score; using derived"
                );
            }
        }

        let justification = payload["justification"]
            .as_str()
            .map(str::trim)
            .unwrap_or("")
            .to_string();
        if justification.is_empty() {
            return Err(ChainError::Validation {
                stage,
                reason: "justification is missing".into(),
            });
        }

        let output = RankingOutput {
            score,
            category,
            justification,
            trader_action: TraderAction::from_score(score),
            reasoning: str_field(&payload, "reasoning"),
        };
        info!(
            article_id = %article.article_id,
            stage = %stage,
            elapsed_ms = usage.elapsed_ms,
            score = %score,
            category = category.as_str(),
            "stage completed"
        );
        Ok((output, usage))
    }

    /// Execute the full 4-stage chain. Short-circuits at the first failing
    /// stage; the accumulated state (token counts included) is dropped on
    /// failure so aborted chains leave no accounting trace.
    pub async fn execute(
        &self,
        article: &Article,
        snapshot: &MarketSnapshot,
    ) -> Result<ProcessedArticle, ChainError> {
        let mut state = EnrichmentState::new(article.article_id.clone());

        let (summary, usage) = self.summarize(article).await?;
        state.record_usage(usage);
        let summary_text = summary.summary.clone();
        state.summary = Some(summary);

        let (topics, usage) = self.extract_topics(article, &summary_text).await?;
        state.record_usage(usage);
        let topic_list = topics.topics.clone();
        state.topics = Some(topics);

        let (impact, usage) = self
            .analyze_impact(article, &summary_text, &topic_list, snapshot)
            .await?;
        state.record_usage(usage);
        state.impact = Some(impact.clone());

        let (ranking, usage) = self
            .rank(article, &summary_text, &topic_list, &impact)
            .await?;
        state.record_usage(usage);
        state.ranking = Some(ranking);

        let processed = state
            .finalize(&self.pricing)
            .expect("all four stages recorded");

        info!(
            article_id = %article.article_id,
            total_tokens = processed.total_tokens(),
            elapsed_ms = processed.processing_time_ms,
            cost_usd = processed.cost_usd,
            "chain completed"
        );
        Ok(processed)
    }

    pub fn provider_name(&self) -> &'static str {
        self.generator.name()
    }
}

fn str_field(payload: &Value, key: &str) -> String {
    payload[key].as_str().unwrap_or("").to_string()
}

/// Confidence defaults to 0.5 and is clamped into [0,1].
fn confidence_field(payload: &Value) -> f64 {
    payload["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;
    use chrono::Utc;

    fn article() -> Article {
        Article::new(
            "a-1",
            "https://cnn.example/2025/06/01/reforma",
            "CNN_Colombia",
            "Gobierno anuncia reforma tributaria",
            "El gobierno presentó una reforma tributaria que afecta la inversión.",
            Utc::now(),
        )
    }

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot::new("s-1", Utc::now())
    }

    fn executor(gen: Arc<ScriptedGenerator>) -> ChainExecutor {
        ChainExecutor::new(gen, &GeneratorConfig::default(), &Pricing::default())
    }

    fn queue_stage1(gen: &ScriptedGenerator) {
        gen.push_text(
            r#"{"reasoning": "paso a paso", "summary": "La reforma tributaria afecta la inversión extranjera."}"#,
            100,
            40,
        );
    }

    #[tokio::test]
    async fn unrecognized_topics_are_dropped_and_empty_defaults_to_other() {
        let gen = Arc::new(ScriptedGenerator::new());
        gen.push_text(
            r#"{"reasoning": "r", "topics": ["deportes", "clima"], "confidence": 0.9}"#,
            80,
            30,
        );
        let exec = executor(gen);
        let (out, _) = exec
            .extract_topics(&article(), "resumen largo de prueba")
            .await
            .unwrap();
        assert_eq!(out.topics, vec![TopicCategory::Other]);
    }

    #[tokio::test]
    async fn recognized_topics_are_kept_distinct() {
        let gen = Arc::new(ScriptedGenerator::new());
        gen.push_text(
            r#"{"reasoning": "r", "topics": ["economy", "energy", "economy"], "confidence": 1.4}"#,
            80,
            30,
        );
        let exec = executor(gen);
        let (out, _) = exec
            .extract_topics(&article(), "resumen largo de prueba")
            .await
            .unwrap();
        assert_eq!(out.topics, vec![TopicCategory::Economy, TopicCategory::Energy]);
        // confidence clamped
        assert!((out.confidence - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_direction_is_a_stage_failure() {
        let gen = Arc::new(ScriptedGenerator::new());
        gen.push_text(
            r#"{"reasoning": "r", "mechanisms": ["m1"], "confidence": 0.7, "time_horizon": "short-term"}"#,
            80,
            30,
        );
        let exec = executor(gen);
        let err = exec
            .analyze_impact(&article(), "resumen", &[TopicCategory::Economy], &snapshot())
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Validation { .. }));
        assert_eq!(err.stage(), ProcessingStage::ImpactAnalysis);
    }

    #[tokio::test]
    async fn declared_category_and_action_are_overridden_by_score() {
        let gen = Arc::new(ScriptedGenerator::new());
        // score 5 but free text claims Moderate/monitor
        gen.push_text(
            r#"{"reasoning": "r", "score": 5, "category": "Moderate", "justification": "Shock petrolero inminente.", "trader_action": "monitor"}"#,
            80,
            30,
        );
        let exec = executor(gen);
        let impact = ImpactOutput {
            direction: ImpactDirection::Negative,
            mechanisms: vec![],
            confidence: 0.9,
            time_horizon: TimeHorizon::ShortTerm,
            reasoning: "r".into(),
        };
        let (out, _) = exec
            .rank(&article(), "resumen", &[TopicCategory::Energy], &impact)
            .await
            .unwrap();
        assert_eq!(out.score.get(), 5);
        assert_eq!(out.category, RankingCategory::Critical);
        assert_eq!(out.trader_action, TraderAction::Urgent);
    }

    #[tokio::test]
    async fn out_of_range_score_fails_before_mapping() {
        let gen = Arc::new(ScriptedGenerator::new());
        gen.push_text(
            r#"{"reasoning": "r", "score": 7, "justification": "demasiado importante"}"#,
            80,
            30,
        );
        let exec = executor(gen);
        let impact = ImpactOutput {
            direction: ImpactDirection::Neutral,
            mechanisms: vec![],
            confidence: 0.5,
            time_horizon: TimeHorizon::MediumTerm,
            reasoning: "r".into(),
        };
        let err = exec
            .rank(&article(), "resumen", &[TopicCategory::Other], &impact)
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Validation { .. }));
    }

    #[tokio::test]
    async fn short_summary_fails_stage_one() {
        let gen = Arc::new(ScriptedGenerator::new());
        gen.push_text(r#"{"reasoning": "r", "summary": "corto"}"#, 80, 30);
        let exec = executor(gen);
        let err = exec.summarize(&article()).await.unwrap_err();
        assert!(matches!(err, ChainError::Validation { .. }));
        assert_eq!(err.stage(), ProcessingStage::Summarization);
    }

    #[tokio::test]
    async fn full_chain_produces_processed_article_with_summed_usage() {
        let gen = Arc::new(ScriptedGenerator::new());
        queue_stage1(&gen);
        gen.push_text(
            r#"{"reasoning": "r", "topics": ["economy", "politics"], "confidence": 0.9}"#,
            90,
            35,
        );
        gen.push_text(
            r#"{"reasoning": "r", "direction": "NEGATIVE", "mechanisms": ["fuga de inversión"], "confidence": 0.8, "time_horizon": "medium-term"}"#,
            110,
            45,
        );
        gen.push_text(
            r#"{"reasoning": "r", "score": 4, "category": "High", "justification": "Reforma con impacto fiscal directo.", "trader_action": "alert"}"#,
            95,
            25,
        );

        let exec = executor(gen.clone());
        let processed = exec.execute(&article(), &snapshot()).await.unwrap();

        assert_eq!(processed.input_tokens, 100 + 90 + 110 + 95);
        assert_eq!(processed.output_tokens, 40 + 35 + 45 + 25);
        assert_eq!(processed.ranking_score.get(), 4);
        assert_eq!(processed.ranking_category, RankingCategory::High);
        assert_eq!(processed.trader_action, TraderAction::Alert);
        assert_eq!(processed.impact_direction, ImpactDirection::Negative);
        assert!(processed.cost_usd > 0.0);
        assert_eq!(gen.remaining(), 0);
    }

    #[tokio::test]
    async fn stage_failure_short_circuits_remaining_stages() {
        let gen = Arc::new(ScriptedGenerator::new());
        queue_stage1(&gen);
        // stage 2 returns prose, not JSON
        gen.push_text("no puedo clasificar esto", 90, 35);
        // stage 3/4 responses queued but must never be consumed
        gen.push_text(r#"{"direction": "NEUTRAL"}"#, 1, 1);
        gen.push_text(r#"{"score": 3}"#, 1, 1);

        let exec = executor(gen.clone());
        let err = exec.execute(&article(), &snapshot()).await.unwrap_err();
        assert_eq!(err.stage(), ProcessingStage::TopicExtraction);
        assert_eq!(gen.remaining(), 2, "later stages must not run");
    }

    #[tokio::test]
    async fn exhausted_provider_is_a_transport_failure() {
        let gen = Arc::new(ScriptedGenerator::new());
        let exec = executor(gen);
        let err = exec.execute(&article(), &snapshot()).await.unwrap_err();
        assert!(matches!(err, ChainError::Transport { .. }));
        assert_eq!(err.stage(), ProcessingStage::Summarization);
    }
}
