//! Vector index construction and retrieval
//!
//! The index is built once from the loaded documents and is read-only
//! afterwards: split into nodes, embed in batches, insert into HNSW.

mod splitter;
mod vector_store;

pub use splitter::SentenceSplitter;
pub use vector_store::HnswVectorStore;

use indicatif::ProgressBar;

use crate::config::QueryConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::query::RetrieverQueryEngine;
use crate::types::{Document, NodeWithScore};

/// Embedded nodes ready for similarity search
pub struct VectorStoreIndex {
    store: HnswVectorStore,
}

impl VectorStoreIndex {
    /// Split, embed, and index `documents`
    ///
    /// `progress` is advanced once per embedded node; pass
    /// `ProgressBar::hidden()` when no output is wanted.
    pub fn from_documents(
        documents: &[Document],
        splitter: &SentenceSplitter,
        embedder: &dyn EmbeddingProvider,
        batch_size: usize,
        progress: &ProgressBar,
    ) -> Result<Self> {
        let nodes = splitter.split_documents(documents);
        tracing::info!(
            "Split {} documents into {} nodes",
            documents.len(),
            nodes.len()
        );

        progress.set_length(nodes.len() as u64);

        let mut entries = Vec::with_capacity(nodes.len());
        for batch in nodes.chunks(batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|n| n.text.clone()).collect();
            let embeddings = embedder.embed_batch(&texts)?;

            if embeddings.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            entries.extend(batch.iter().cloned().zip(embeddings));
            progress.inc(batch.len() as u64);
            tracing::debug!("Embedded batch of {} nodes", batch.len());
        }

        progress.finish_and_clear();

        let store = HnswVectorStore::build(entries)?;
        Ok(Self { store })
    }

    /// Top `top_k` nodes for an already-embedded query
    pub fn retrieve(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<NodeWithScore>> {
        self.store.search(query_embedding, top_k)
    }

    /// Number of indexed nodes
    pub fn node_count(&self) -> usize {
        self.store.len()
    }

    /// Query engine that retrieves from this index and answers with `llm`
    pub fn as_query_engine<'a>(
        &'a self,
        embedder: &'a dyn EmbeddingProvider,
        llm: &'a dyn LlmProvider,
        config: &QueryConfig,
    ) -> RetrieverQueryEngine<'a> {
        RetrieverQueryEngine::new(self, embedder, llm, config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockEmbeddingProvider;
    use crate::types::{DocumentMetadata, FileType};

    fn doc(name: &str, text: &str) -> Document {
        Document::new(
            text.to_string(),
            FileType::Txt,
            String::new(),
            DocumentMetadata {
                file_name: name.to_string(),
                ..Default::default()
            },
        )
    }

    /// Two-dimensional toy embedding: is it about France or about Rust?
    fn toy_embedding(text: &str) -> Vec<f32> {
        if text.contains("France") {
            vec![1.0, 0.0]
        } else {
            vec![0.0, 1.0]
        }
    }

    #[test]
    fn test_from_documents_embeds_every_node_in_batches() {
        let docs = vec![
            doc("france.txt", "Paris is the capital of France."),
            doc("rust.txt", "Rust has no garbage collector."),
            doc("empty.txt", "   "),
        ];

        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed_batch()
            .times(2)
            .returning(|texts: &[String]| Ok(texts.iter().map(|t| toy_embedding(t)).collect()));

        let splitter = SentenceSplitter::new(256, 20).unwrap();
        let index =
            VectorStoreIndex::from_documents(&docs, &splitter, &embedder, 1, &ProgressBar::hidden())
                .unwrap();

        assert_eq!(index.node_count(), 2);

        let results = index.retrieve(&[1.0, 0.0], 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].node.metadata.file_name, "france.txt");
    }

    #[test]
    fn test_embedding_count_mismatch_is_an_error() {
        let docs = vec![doc("a.txt", "Some text.")];

        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed_batch()
            .returning(|_: &[String]| Ok(Vec::new()));

        let splitter = SentenceSplitter::new(256, 20).unwrap();
        let result =
            VectorStoreIndex::from_documents(&docs, &splitter, &embedder, 10, &ProgressBar::hidden());
        assert!(matches!(result, Err(Error::Embedding(_))));
    }

    #[test]
    fn test_embedding_failure_propagates() {
        let docs = vec![doc("a.txt", "Some text.")];

        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed_batch()
            .returning(|_: &[String]| Err(Error::embedding("connection refused")));

        let splitter = SentenceSplitter::new(256, 20).unwrap();
        let result =
            VectorStoreIndex::from_documents(&docs, &splitter, &embedder, 10, &ProgressBar::hidden());
        assert!(result.is_err());
    }
}
