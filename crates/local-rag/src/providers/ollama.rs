//! Ollama HTTP client and the provider implementations built on it

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::OllamaConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Blocking Ollama API client with optional retry
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: OllamaConfig,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Longest wait between two attempts
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Exponential backoff: 1s, 2s, 4s, ... capped at [`MAX_BACKOFF`]
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt)).min(MAX_BACKOFF)
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Run `operation`, retrying with exponential backoff up to `max_retries` times
    fn retry_request<T>(&self, operation: impl Fn() -> Result<T>) -> Result<T> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            match operation() {
                Ok(result) => return Ok(result),
                Err(e) if attempt < max_retries => {
                    let delay = backoff_delay(attempt);
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}; retrying in {:?}",
                        attempt + 1,
                        max_retries + 1,
                        e,
                        delay
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Check if Ollama is available
    pub fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send() {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::debug!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Generate an embedding
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let request = EmbedRequest {
            model: &self.config.embed_model,
            prompt: text,
        };

        self.retry_request(|| {
            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                return Err(Error::embedding(format!(
                    "Embedding failed: HTTP {} - {}",
                    status, body
                )));
            }

            let embed_response: EmbedResponse = response.json().map_err(|e| {
                Error::embedding(format!("Failed to parse embedding response: {}", e))
            })?;

            if embed_response.embedding.is_empty() {
                return Err(Error::embedding(format!(
                    "Model '{}' returned an empty embedding",
                    self.config.embed_model
                )));
            }

            Ok(embed_response.embedding)
        })
    }

    /// Complete a prompt with the generation model
    pub fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        let request = GenerateRequest {
            model: &self.config.generate_model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
            },
        };

        tracing::debug!("Generating answer with model: {}", self.config.generate_model);

        self.retry_request(|| {
            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .map_err(|e| Error::llm(format!("Generation request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                return Err(Error::llm(format!(
                    "Generation failed: HTTP {} - {}",
                    status, body
                )));
            }

            let generate_response: GenerateResponse = response.json().map_err(|e| {
                Error::llm(format!("Failed to parse generation response: {}", e))
            })?;

            Ok(generate_response.response)
        })
    }
}

/// Ollama embedding provider
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
}

impl OllamaEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }

    /// Embedding model name
    pub fn model(&self) -> &str {
        &self.client.config().embed_model
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text)
    }

    fn health_check(&self) -> Result<bool> {
        self.client.health_check()
    }
}

/// Ollama LLM provider for answer generation
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
}

impl OllamaLlm {
    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }

    /// Generation model name
    pub fn model(&self) -> &str {
        &self.client.config().generate_model
    }
}

impl LlmProvider for OllamaLlm {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.client.generate(prompt)
    }

    fn health_check(&self) -> Result<bool> {
        self.client.health_check()
    }
}

/// Embedder and LLM sharing a single client
pub struct OllamaProvider {
    embedder: OllamaEmbedder,
    llm: OllamaLlm,
}

impl OllamaProvider {
    /// Create a new combined Ollama provider
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = Arc::new(OllamaClient::new(config)?);
        Ok(Self {
            embedder: OllamaEmbedder::from_client(Arc::clone(&client)),
            llm: OllamaLlm::from_client(client),
        })
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &OllamaEmbedder {
        &self.embedder
    }

    /// Get the LLM provider
    pub fn llm(&self) -> &OllamaLlm {
        &self.llm
    }

    /// Split into separate providers
    pub fn split(self) -> (OllamaEmbedder, OllamaLlm) {
        (self.embedder, self.llm)
    }
}
