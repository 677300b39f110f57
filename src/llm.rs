// src/llm.rs
//! Text-generation collaborator: provider trait, the Anthropic messages
//! client, and a scripted generator for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::GeneratorConfig;

/// One generation call's inputs. `max_output_tokens` and `temperature` come
/// from the generator config; the chain fills prompt and system text.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub system: Option<&'a str>,
}

/// Response text plus the token accounting the cost tracker needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Provider abstraction. Transport failures surface as errors; the chain
/// executor maps them to a per-article abort.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<Generation>;
    fn name(&self) -> &'static str;
}

/// Parse a response body as JSON, tolerating a markdown code fence around it.
pub fn parse_json_payload(text: &str) -> Result<Value> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    let body = body.trim();
    serde_json::from_str(body).with_context(|| {
        let head: String = body.chars().take(120).collect();
        format!("response is not valid JSON: {head}")
    })
}

// ------------------------------------------------------------
// Anthropic messages client
// ------------------------------------------------------------

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Concrete provider for the Anthropic messages API. Requires
/// `ANTHROPIC_API_KEY`. Timeouts live on the HTTP client; the core treats a
/// timeout like any other transport failure.
pub struct AnthropicGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("usdcop-news-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Reads `ANTHROPIC_API_KEY` (after a best-effort `.env` load) and uses
    /// the model from the generator config.
    pub fn from_env(config: &GeneratorConfig) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let api_key =
            std::env::var("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY is not set")?;
        Self::new(api_key, config.model.clone())
    }
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ApiContent>,
    usage: ApiUsage,
}

#[derive(Deserialize)]
struct ApiContent {
    text: String,
}

#[derive(Deserialize)]
struct ApiUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[async_trait::async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<Generation> {
        let req = ApiRequest {
            model: &self.model,
            max_tokens: request.max_output_tokens,
            temperature: request.temperature,
            messages: vec![ApiMessage {
                role: "user",
                content: request.prompt,
            }],
            system: request.system,
        };

        let resp = self
            .http
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&req)
            .send()
            .await
            .context("sending generation request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let head: String = body.chars().take(200).collect();
            return Err(anyhow!("generation request failed: {status}: {head}"));
        }

        let body: ApiResponse = resp.json().await.context("decoding generation response")?;
        let text = body
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| anyhow!("generation response has no content blocks"))?;

        info!(
            model = %self.model,
            input_tokens = body.usage.input_tokens,
            output_tokens = body.usage.output_tokens,
            "generation call succeeded"
        );

        Ok(Generation {
            text,
            input_tokens: body.usage.input_tokens,
            output_tokens: body.usage.output_tokens,
        })
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

// ------------------------------------------------------------
// Scripted generator for tests
// ------------------------------------------------------------

/// Returns queued responses in order; an exhausted queue behaves like an
/// unreachable provider. Lets tests drive each chain stage deterministically.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Generation>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, generation: Generation) {
        self.responses
            .lock()
            .expect("poisoned script queue")
            .push_back(generation);
    }

    /// Queue a text response with fixed token counts.
    pub fn push_text(&self, text: impl Into<String>, input_tokens: u64, output_tokens: u64) {
        self.push(Generation {
            text: text.into(),
            input_tokens,
            output_tokens,
        });
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().expect("poisoned script queue").len()
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _request: GenerationRequest<'_>) -> Result<Generation> {
        self.responses
            .lock()
            .expect("poisoned script queue")
            .pop_front()
            .ok_or_else(|| anyhow!("scripted generator exhausted"))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
