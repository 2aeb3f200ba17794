//! Provider abstractions for embeddings and LLM completion

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm, OllamaProvider};

#[cfg(test)]
pub use embedding::MockEmbeddingProvider;
#[cfg(test)]
pub use llm::MockLlmProvider;
