use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::preflight::GptConfig;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[async_trait]
pub trait LlmProviderTrait: Send + Sync {
    async fn complete(&self, prompt: &str, params: &LlmParams) -> Result<String>;
    async fn complete_with_system(&self, system: &str, prompt: &str, params: &LlmParams) -> Result<String>;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Default)]
pub struct LlmParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

/// Builds a chat provider for a validated set of credentials.
pub trait LlmConnector: Send + Sync {
    fn connect(&self, config: &GptConfig) -> Result<Box<dyn LlmProviderTrait>>;
}

// OpenAI-compatible connector
#[derive(Debug, Clone)]
pub struct OpenAIConnector {
    base_url: String,
    request_timeout: Duration,
}

impl OpenAIConnector {
    pub fn new(base_url: Option<String>, request_timeout: Duration) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            request_timeout,
        }
    }
}

impl LlmConnector for OpenAIConnector {
    fn connect(&self, config: &GptConfig) -> Result<Box<dyn LlmProviderTrait>> {
        let provider = OpenAIProvider::new(
            config.model_name.clone(),
            config.api_key.clone(),
            self.base_url.clone(),
            config.max_requests_per_minute,
            self.request_timeout,
        )?;
        info!(
            "Initialized {} LLM provider with model {}",
            provider.name(),
            config.model_name
        );
        Ok(Box::new(provider))
    }
}

// OpenAI Provider
struct OpenAIProvider {
    model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl OpenAIProvider {
    fn new(
        model: String,
        api_key: String,
        base_url: String,
        max_requests_per_minute: u32,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            model,
            api_key,
            base_url,
            client,
            min_interval: min_request_interval(max_requests_per_minute),
            last_request: Mutex::new(None),
        })
    }

    /// Spaces requests so the configured per-minute limit is never exceeded.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let next = previous + self.min_interval;
            if next > Instant::now() {
                debug!("Rate limiting OpenAI request until next slot");
                tokio::time::sleep_until(next).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn send(&self, messages: Vec<OpenAIMessage>, params: &LlmParams) -> Result<String> {
        self.throttle().await;

        let request = OpenAIRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(request_max_tokens(params)),
            temperature: params.temperature.unwrap_or(0.7),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<OpenAIResponse>()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("No response from OpenAI")
    }
}

/// Token limit sent with a request; 1000 when unset, saturating at `u32::MAX`.
fn request_max_tokens(params: &LlmParams) -> u32 {
    params
        .max_tokens
        .map_or(1000, |t| u32::try_from(t).unwrap_or(u32::MAX))
}

fn min_request_interval(max_requests_per_minute: u32) -> Duration {
    Duration::from_secs_f64(60.0 / f64::from(max_requests_per_minute.max(1)))
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: Option<u32>,
    temperature: f32,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

impl OpenAIMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmProviderTrait for OpenAIProvider {
    async fn complete(&self, prompt: &str, params: &LlmParams) -> Result<String> {
        self.send(vec![OpenAIMessage::new("user", prompt)], params).await
    }

    async fn complete_with_system(&self, system: &str, prompt: &str, params: &LlmParams) -> Result<String> {
        self.send(
            vec![
                OpenAIMessage::new("system", system),
                OpenAIMessage::new("user", prompt),
            ],
            params,
        )
        .await
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}
