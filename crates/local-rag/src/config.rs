//! Configuration for the RAG pipeline
//!
//! Every field has a default, so a TOML file only needs to name the values it
//! changes. Command-line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Upper bound for `ollama.max_retries`
pub const MAX_RETRIES: u32 = 10;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Document source
    pub data: DataConfig,
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval and prompt configuration
    pub query: QueryConfig,
    /// Interactive loop behavior
    pub repl: ReplConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        Ok(config)
    }

    /// Default config file location (`~/.config/local-rag/config.toml` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("local-rag").join("config.toml"))
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.ollama.temperature) {
            return Err(Error::config(format!(
                "temperature must be within [0, 2], got {}",
                self.ollama.temperature
            )));
        }
        if self.query.similarity_top_k == 0 {
            return Err(Error::config("similarity_top_k must be at least 1"));
        }
        if self.chunking.embed_batch_size == 0 {
            return Err(Error::config("embed_batch_size must be at least 1"));
        }
        if self.ollama.max_retries > MAX_RETRIES {
            return Err(Error::config(format!(
                "max_retries must be at most {}, got {}",
                MAX_RETRIES, self.ollama.max_retries
            )));
        }
        self.chunking.validate()
    }
}

/// Document source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory to load documents from
    pub dir: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Skip dot-files and dot-directories
    pub exclude_hidden: bool,
    /// Only load these extensions (lowercase, no dot). Empty means all.
    pub required_exts: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            recursive: false,
            exclude_hidden: true,
            required_exts: Vec::new(),
        }
    }
}

/// Ollama configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation (0 = deterministic)
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests (0 = fail on first error)
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "mxbai-embed-large".to_string(),
            generate_model: "llama3".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// Number of chunks sent per embedding batch
    pub embed_batch_size: usize,
}

impl ChunkingConfig {
    /// Check that the size/overlap pair can make progress
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be at least 1"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 200,
            embed_batch_size: 10,
        }
    }
}

/// Retrieval and prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Number of nodes retrieved per question
    pub similarity_top_k: usize,
    /// Maximum characters of retrieved context placed in the prompt
    pub context_window: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            similarity_top_k: 2,
            context_window: 3900 * 4,
        }
    }
}

/// Interactive loop configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// What to do when a query fails
    pub on_error: QueryErrorPolicy,
    /// Print the retrieved sources after each answer
    pub show_sources: bool,
}

/// Handling of a failed query inside the interactive loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueryErrorPolicy {
    /// Stop the loop and return the error
    #[default]
    Abort,
    /// Print the error and keep prompting
    Report,
}
