//! Error types for the RAG pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data directory is missing or not a directory
    #[error("Directory {} does not exist.", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Data directory contains no loadable files
    #[error("No files found in {}.", .0.display())]
    NoFilesFound(PathBuf),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Ollama/LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Vector index error
    #[error("Index error: {0}")]
    Index(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config error
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Terminal line editor error
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// Interrupt handler could not be installed
    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an index error
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_errors_name_the_path() {
        let err = Error::DirectoryNotFound(PathBuf::from("data"));
        assert_eq!(err.to_string(), "Directory data does not exist.");

        let err = Error::NoFilesFound(PathBuf::from("data"));
        assert_eq!(err.to_string(), "No files found in data.");
    }

    #[test]
    fn test_file_parse_message() {
        let err = Error::file_parse("report.pdf", "no text");
        assert_eq!(err.to_string(), "Failed to parse file 'report.pdf': no text");
    }
}
