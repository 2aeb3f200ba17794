//! LLM provider trait for generating answers

use crate::error::Result;

/// Trait for prompt completion
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (llama3, phi3, ...)
#[cfg_attr(test, mockall::automock)]
pub trait LlmProvider {
    /// Complete a fully rendered prompt
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is reachable
    fn health_check(&self) -> Result<bool>;
}
