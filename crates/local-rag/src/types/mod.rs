//! Core types for the RAG pipeline

pub mod document;
pub mod response;

pub use document::{Document, DocumentMetadata, FileType, TextNode};
pub use response::{NodeWithScore, QueryResponse, EMPTY_RESPONSE};
