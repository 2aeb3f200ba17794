//! local-rag: ask questions about a folder of documents with local Ollama models
//!
//! The pipeline is load → split → embed → index once at startup, then an
//! interactive loop where each question is embedded, the closest nodes are
//! retrieved from an HNSW index, and a local LLM answers from that context.

pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod providers;
pub mod query;
pub mod repl;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use index::VectorStoreIndex;
pub use query::{QueryEngine, RetrieverQueryEngine};
pub use types::{Document, NodeWithScore, QueryResponse, TextNode};
