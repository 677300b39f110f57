// src/config.rs
//! Pipeline configuration: one immutable value built at process start and
//! passed by reference to each component. Loadable from TOML with env
//! overrides for the knobs operators actually tune.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const ENV_SIMILARITY_THRESHOLD: &str = "SIMILARITY_THRESHOLD";
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub gates: GateConfig,
    pub generator: GeneratorConfig,
    pub pricing: Pricing,
    pub cost: CostConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub min_content_length: usize,
    pub max_content_length: usize,
    /// Minimum ratio of Spanish marker hits to word count.
    pub min_language_ratio: f64,
    pub min_keyword_matches: usize,
    pub max_article_age_hours: f64,
    /// Fuzzy-title dedup threshold, in [0,1].
    pub similarity_threshold: f64,
    /// Dedup gate is implemented but off in the default wiring; the corpus
    /// scan is O(day partition) per article.
    pub enable_duplicate_gate: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_content_length: 200,
            max_content_length: 50_000,
            min_language_ratio: 0.3,
            min_keyword_matches: 2,
            max_article_age_hours: 200.0,
            similarity_threshold: 0.9,
            enable_duplicate_gate: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_output_tokens: 2000,
            temperature: 0.3,
        }
    }
}

/// Linear per-token pricing, USD per 1M tokens, separate input/output rates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Pricing {
    pub input_cost_per_1m: f64,
    pub output_cost_per_1m: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            input_cost_per_1m: 3.0,
            output_cost_per_1m: 15.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub daily_threshold_usd: f64,
    pub enable_cost_alerts: bool,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            daily_threshold_usd: 10.0,
            enable_cost_alerts: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gates: GateConfig::default(),
            generator: GeneratorConfig::default(),
            pricing: Pricing::default(),
            cost: CostConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from an explicit TOML path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        let mut cfg: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("parsing pipeline config {}", path.display()))?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $PIPELINE_CONFIG_PATH
    /// 2) config/pipeline.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            return Self::load_from(&PathBuf::from(p));
        }
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from(&default_path);
        }
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(t) = parse_threshold_env(std::env::var(ENV_SIMILARITY_THRESHOLD).ok()) {
            self.gates.similarity_threshold = t;
        }
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .map(|v| v.clamp(0.0, 1.0))
}
