//! Preflight readiness checks for the remote model services.
//!
//! The configuration is validated first, accumulating every problem; when it
//! is invalid no remote call is attempted. Otherwise the chat service and the
//! embedding model are probed independently, each inside its own wall-clock
//! budget.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::embeddings::EmbeddingLoader;
use crate::llm::{LlmConnector, LlmParams};

/// Default wall-clock budget for each probe.
pub const PROBE_BUDGET: Duration = Duration::from_secs(5);
pub const PROBE_SYSTEM_PROMPT: &str = "Echo the user-provided JSON input.";
pub const PROBE_TEXT: &str = "Probe String";

/// Required `GptConfig` properties, in alphabetical order.
const GPT_CONFIG_KEYS: [&str; 3] = ["ApiKey", "MaxRequestsPerMinute", "ModelName"];

/// Credentials and limits for the chat-completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GptConfig {
    pub api_key: String,
    pub model_name: String,
    pub max_requests_per_minute: u32,
}

/// A preflight configuration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightConfig {
    pub gpt: GptConfig,
    pub embedding_model_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessState {
    pub chat_service_ready: bool,
    pub embedding_service_ready: bool,
    pub errors: Vec<String>,
}

impl ReadinessState {
    pub fn is_ready(&self) -> bool {
        self.chat_service_ready && self.embedding_service_ready && self.errors.is_empty()
    }
}

/// Checks the raw preflight inputs, collecting every violation.
pub fn validate_preflight_config(
    gpt_config: &Value,
    embedding_model_name: &Value,
) -> Result<PreflightConfig, Vec<String>> {
    let mut errors = Vec::new();
    let mut gpt = None;

    match gpt_config.as_object() {
        None => errors.push("GptConfig must be an object.".to_string()),
        Some(map) => {
            for key in GPT_CONFIG_KEYS {
                if !map.contains_key(key) {
                    errors.push(format!("Missing GptConfig property: {}", key));
                }
            }

            let api_key = map.get("ApiKey").and_then(Value::as_str);
            let model_name = map.get("ModelName").and_then(Value::as_str);
            let max_requests = map
                .get("MaxRequestsPerMinute")
                .and_then(Value::as_u64)
                .filter(|n| *n > 0)
                .and_then(|n| u32::try_from(n).ok());

            if api_key.is_none() {
                errors.push("GptConfig.ApiKey must be a string.".to_string());
            }
            if model_name.is_none() {
                errors.push("GptConfig.ModelName must be a string.".to_string());
            }
            if max_requests.is_none() {
                errors.push("GptConfig.MaxRequestsPerMinute must be a positive integer.".to_string());
            }

            if let (Some(api_key), Some(model_name), Some(max_requests_per_minute)) =
                (api_key, model_name, max_requests)
            {
                gpt = Some(GptConfig {
                    api_key: api_key.to_string(),
                    model_name: model_name.to_string(),
                    max_requests_per_minute,
                });
            }
        }
    }

    let embedding = embedding_model_name
        .as_str()
        .filter(|name| !name.trim().is_empty());
    if embedding.is_none() {
        errors.push("EmbeddingModelName must be a non-empty string.".to_string());
    }

    match (gpt, embedding) {
        (Some(gpt), Some(name)) if errors.is_empty() => Ok(PreflightConfig {
            gpt,
            embedding_model_name: name.to_string(),
        }),
        _ => Err(errors),
    }
}

/// One-shot readiness check against the chat and embedding services.
pub struct ReadinessProbe {
    llm: Arc<dyn LlmConnector>,
    embeddings: Arc<dyn EmbeddingLoader>,
    budget: Duration,
}

impl ReadinessProbe {
    pub fn new(llm: Arc<dyn LlmConnector>, embeddings: Arc<dyn EmbeddingLoader>) -> Self {
        Self {
            llm,
            embeddings,
            budget: PROBE_BUDGET,
        }
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Validates the raw configuration, then probes both services.
    pub async fn run(&self, gpt_config: &Value, embedding_model_name: &Value) -> ReadinessState {
        match validate_preflight_config(gpt_config, embedding_model_name) {
            Ok(config) => self.run_validated(&config).await,
            Err(errors) => {
                warn!("Preflight configuration invalid ({} errors); skipping probes", errors.len());
                ReadinessState {
                    chat_service_ready: false,
                    embedding_service_ready: false,
                    errors,
                }
            }
        }
    }

    pub async fn run_validated(&self, config: &PreflightConfig) -> ReadinessState {
        let mut errors = Vec::new();

        let chat_service_ready = match self.probe_chat(&config.gpt).await {
            Ok(()) => true,
            Err(e) => {
                errors.push(e);
                false
            }
        };

        let embedding_service_ready = match self.probe_embeddings(&config.embedding_model_name).await {
            Ok(()) => true,
            Err(e) => {
                errors.push(e);
                false
            }
        };

        info!(
            chat_service_ready,
            embedding_service_ready,
            errors = errors.len(),
            "Preflight finished"
        );

        ReadinessState {
            chat_service_ready,
            embedding_service_ready,
            errors,
        }
    }

    async fn probe_chat(&self, gpt: &GptConfig) -> Result<(), String> {
        let started = Instant::now();
        let exchange = async {
            let provider = self.llm.connect(gpt)?;
            let payload = json!({"Ping": "Pong"}).to_string();
            let params = LlmParams {
                temperature: Some(0.0),
                max_tokens: Some(50),
            };
            let reply = provider
                .complete_with_system(PROBE_SYSTEM_PROMPT, &payload, &params)
                .await?;
            let data: Value = serde_json::from_str(&reply)?;
            Ok::<Value, anyhow::Error>(data)
        };

        match tokio::time::timeout(self.budget, exchange).await {
            Err(_) => Err(format!(
                "Gpt connectivity test exceeded {} second warm-up limit.",
                self.budget.as_secs_f64()
            )),
            Ok(Err(e)) => Err(format!("Gpt connectivity failed: {}", e)),
            Ok(Ok(data)) if data.get("Ping").and_then(Value::as_str) == Some("Pong") => {
                info!("Chat service answered the probe in {:?}", started.elapsed());
                Ok(())
            }
            Ok(Ok(_)) => Err("Gpt connectivity failed: reply did not echo the probe payload".to_string()),
        }
    }

    async fn probe_embeddings(&self, model_name: &str) -> Result<(), String> {
        let started = Instant::now();
        let warm_up = async {
            let model = self.embeddings.load(model_name).await?;
            model.encode(vec![PROBE_TEXT.to_string()]).await
        };

        match tokio::time::timeout(self.budget, warm_up).await {
            Err(_) => Err(format!(
                "Embedding model load exceeded {} second warm-up limit.",
                self.budget.as_secs_f64()
            )),
            Ok(Err(e)) => Err(format!("Embedding model failed: {}", e)),
            Ok(Ok(_)) => {
                info!("Embedding model {} ready in {:?}", model_name, started.elapsed());
                Ok(())
            }
        }
    }
}
