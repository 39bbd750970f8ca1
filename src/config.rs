use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TalentPrepError};
use crate::logging::LoggingConfig;

const API_KEY_VARS: [&str; 2] = ["OPENAI_API_KEY", "AZURE_OPENAI_API_KEY"];
const MODEL_VAR: &str = "AZURE_OPENAI_MODEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepConfig {
    #[serde(default = "default_verbose")]
    pub verbose: bool,

    // LLM settings
    #[serde(default)]
    pub llm_base_url: Option<String>,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: u32,

    // Embedding settings
    #[serde(default)]
    pub embedding_provider: EmbeddingProvider,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default)]
    pub embedding_base_url: Option<String>,
    #[serde(default)]
    pub embedding_api_key: Option<String>,

    // Preflight settings
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EmbeddingProvider {
    OpenAI,
    Ollama,
}

impl Default for EmbeddingProvider {
    fn default() -> Self {
        EmbeddingProvider::Ollama
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::OpenAI => write!(f, "OpenAI"),
            EmbeddingProvider::Ollama => write!(f, "Ollama"),
        }
    }
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            verbose: default_verbose(),
            llm_base_url: None,
            llm_model: default_llm_model(),
            llm_api_key: None,
            max_requests_per_minute: default_max_requests_per_minute(),
            embedding_provider: EmbeddingProvider::default(),
            embedding_model: default_embedding_model(),
            embedding_base_url: None,
            embedding_api_key: None,
            probe_timeout_secs: default_probe_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PrepConfig {
    /// Reads a JSON configuration file; absent fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            TalentPrepError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Overrides model-service settings from the process environment.
    ///
    /// The API key comes from `OPENAI_API_KEY`, then `AZURE_OPENAI_API_KEY`;
    /// the chat model from `AZURE_OPENAI_MODEL`. Unset or empty variables
    /// leave the configured value alone.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Same as [`PrepConfig::apply_env`] with an explicit variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = API_KEY_VARS.iter().find_map(|key| non_empty(*key)) {
            self.llm_api_key = Some(api_key);
        }
        if let Some(model) = non_empty(MODEL_VAR) {
            debug!("Using chat model {} from {}", model, MODEL_VAR);
            self.llm_model = model;
        }
    }

    /// The `GptConfig` object handed to the preflight check. A missing API
    /// key is passed through as an empty string.
    pub fn gpt_config_value(&self) -> Value {
        json!({
            "ApiKey": self.llm_api_key.clone().unwrap_or_default(),
            "ModelName": self.llm_model,
            "MaxRequestsPerMinute": self.max_requests_per_minute,
        })
    }
}

// Default value functions
fn default_verbose() -> bool { false }
fn default_llm_model() -> String { "gpt-4o-mini".to_string() }
fn default_max_requests_per_minute() -> u32 { 120 }
fn default_embedding_model() -> String { "all-minilm".to_string() }
fn default_probe_timeout_secs() -> u64 { 5 }
fn default_request_timeout_secs() -> u64 { 30 }
