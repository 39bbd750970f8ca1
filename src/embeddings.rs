use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{EmbeddingProvider, PrepConfig};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1";

/// A loaded embedding model.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn encode(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
    fn name(&self) -> &str;
}

/// Resolves a model name into a ready-to-use embedding model.
#[async_trait]
pub trait EmbeddingLoader: Send + Sync {
    async fn load(&self, model_name: &str) -> Result<Box<dyn EmbeddingModel>>;
}

/// Picks the loader matching the configured provider.
pub fn loader_from_config(config: &PrepConfig) -> Result<Box<dyn EmbeddingLoader>> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let loader: Box<dyn EmbeddingLoader> = match config.embedding_provider {
        EmbeddingProvider::Ollama => Box::new(OllamaEmbeddingLoader::new(
            config.embedding_base_url.clone(),
            timeout,
        )?),
        EmbeddingProvider::OpenAI => Box::new(OpenAIEmbeddingLoader::new(
            config.embedding_base_url.clone(),
            config.embedding_api_key.clone(),
            timeout,
        )?),
    };
    Ok(loader)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

// Ollama Provider (for local embeddings)
#[derive(Clone)]
pub struct OllamaEmbeddingLoader {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaEmbeddingLoader {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: http_client(timeout)?,
        })
    }
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModelTag>,
}

#[derive(Deserialize)]
struct OllamaModelTag {
    name: String,
}

/// Ollama reports models as `name:tag`; a bare name means `:latest`.
fn ollama_model_matches(listed: &str, wanted: &str) -> bool {
    listed == wanted || (!wanted.contains(':') && listed == format!("{}:latest", wanted))
}

#[async_trait]
impl EmbeddingLoader for OllamaEmbeddingLoader {
    async fn load(&self, model_name: &str) -> Result<Box<dyn EmbeddingModel>> {
        let tags = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .context("Failed to connect to Ollama. Is it running?")?
            .error_for_status()?
            .json::<OllamaTagsResponse>()
            .await?;

        if !tags.models.iter().any(|m| ollama_model_matches(&m.name, model_name)) {
            bail!("Model {} not found locally. You may need to pull it first", model_name);
        }

        info!("Loaded Ollama embedding model {}", model_name);
        Ok(Box::new(OllamaEmbeddings {
            model: model_name.to_string(),
            base_url: self.base_url.clone(),
            client: self.client.clone(),
        }))
    }
}

struct OllamaEmbeddings {
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingModel for OllamaEmbeddings {
    async fn encode(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in &texts {
            let response = self
                .client
                .post(format!("{}/api/embeddings", self.base_url))
                .json(&OllamaEmbeddingRequest {
                    model: &self.model,
                    prompt: text,
                })
                .send()
                .await?
                .error_for_status()?
                .json::<OllamaEmbeddingResponse>()
                .await?;

            if response.embedding.is_empty() {
                bail!("Ollama returned an empty embedding for model {}", self.model);
            }
            embeddings.push(response.embedding);
        }

        debug!("Encoded {} texts with {}", embeddings.len(), self.model);
        Ok(embeddings)
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}

// OpenAI Provider
#[derive(Clone)]
pub struct OpenAIEmbeddingLoader {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAIEmbeddingLoader {
    pub fn new(base_url: Option<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_OPENAI_EMBEDDINGS_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl EmbeddingLoader for OpenAIEmbeddingLoader {
    async fn load(&self, model_name: &str) -> Result<Box<dyn EmbeddingModel>> {
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .context("OpenAI API key not provided")?;

        Ok(Box::new(OpenAIEmbeddings {
            model: model_name.to_string(),
            api_key,
            base_url: self.base_url.clone(),
            client: self.client.clone(),
        }))
    }
}

struct OpenAIEmbeddings {
    model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OpenAIEmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbedding>,
}

#[derive(Deserialize)]
struct OpenAIEmbedding {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingModel for OpenAIEmbeddings {
    async fn encode(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let request = OpenAIEmbeddingRequest {
            model: self.model.clone(),
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<OpenAIEmbeddingResponse>()
            .await?;

        Ok(response.data.into_iter().map(|e| e.embedding).collect())
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}
