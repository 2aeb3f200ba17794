//! Retrieval + generation for a single question

use crate::config::QueryConfig;
use crate::error::Result;
use crate::index::VectorStoreIndex;
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::types::QueryResponse;

use super::prompt::PromptBuilder;

/// Answers one question at a time
#[cfg_attr(test, mockall::automock)]
pub trait QueryEngine {
    /// Answer `question`
    fn query(&self, question: &str) -> Result<QueryResponse>;
}

/// Embeds the question, retrieves the closest nodes, and makes one LLM call
pub struct RetrieverQueryEngine<'a> {
    index: &'a VectorStoreIndex,
    embedder: &'a dyn EmbeddingProvider,
    llm: &'a dyn LlmProvider,
    config: QueryConfig,
}

impl<'a> RetrieverQueryEngine<'a> {
    /// Create an engine over a built index
    pub fn new(
        index: &'a VectorStoreIndex,
        embedder: &'a dyn EmbeddingProvider,
        llm: &'a dyn LlmProvider,
        config: QueryConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            llm,
            config,
        }
    }
}

impl QueryEngine for RetrieverQueryEngine<'_> {
    fn query(&self, question: &str) -> Result<QueryResponse> {
        let query_embedding = self.embedder.embed(question)?;
        let results = self
            .index
            .retrieve(&query_embedding, self.config.similarity_top_k)?;

        if results.is_empty() {
            tracing::warn!("No nodes retrieved for question");
            return Ok(QueryResponse::empty());
        }

        tracing::debug!(
            "Retrieved {} nodes (best score {:.3})",
            results.len(),
            results[0].score
        );

        let context = PromptBuilder::build_context(&results, self.config.context_window);
        let prompt = PromptBuilder::build_qa_prompt(question, &context);
        let answer = self.llm.complete(&prompt)?;

        Ok(QueryResponse::new(answer.trim().to_string(), results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::index::SentenceSplitter;
    use crate::providers::{MockEmbeddingProvider, MockLlmProvider};
    use crate::types::{Document, DocumentMetadata, FileType, EMPTY_RESPONSE};
    use indicatif::ProgressBar;

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

    fn toy_embedding(text: &str) -> Vec<f32> {
        if text.contains("France") {
            vec![1.0, 0.0]
        } else {
            vec![0.0, 1.0]
        }
    }

    fn embedder() -> MockEmbeddingProvider {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed_batch()
            .returning(|texts: &[String]| Ok(texts.iter().map(|t| toy_embedding(t)).collect()));
        embedder
            .expect_embed()
            .returning(|text: &str| Ok(toy_embedding(text)));
        embedder
    }

    fn build_index(docs: &[Document], embedder: &MockEmbeddingProvider) -> VectorStoreIndex {
        let splitter = SentenceSplitter::new(256, 20).unwrap();
        VectorStoreIndex::from_documents(docs, &splitter, embedder, 10, &ProgressBar::hidden()).unwrap()
    }

    #[test]
    fn test_query_retrieves_and_generates_once() {
        let embedder = embedder();
        let index = build_index(
            &[
                doc("france.txt", "Paris is the capital of France."),
                doc("rust.txt", "Rust has no garbage collector."),
            ],
            &embedder,
        );

        let mut llm = MockLlmProvider::new();
        llm.expect_complete()
            .withf(|prompt: &str| {
                prompt.contains("Query: What is the capital of France?")
                    && prompt.starts_with("Context information is below.")
                    && prompt.contains("file_name: france.txt\n\nParis is the capital of France.")
            })
            .times(1)
            .returning(|_: &str| Ok("  Paris.\n".to_string()));

        let config = QueryConfig {
            similarity_top_k: 1,
            ..Default::default()
        };
        let engine = index.as_query_engine(&embedder, &llm, &config);
        let response = engine.query("What is the capital of France?").unwrap();

        assert_eq!(response.response, "Paris.");
        assert_eq!(response.source_nodes.len(), 1);
        assert_eq!(response.source_nodes[0].node.metadata.file_name, "france.txt");
    }

    #[test]
    fn test_empty_index_skips_the_llm() {
        let embedder = embedder();
        let index = build_index(&[doc("blank.txt", "  ")], &embedder);

        let mut llm = MockLlmProvider::new();
        llm.expect_complete().times(0);

        let engine = index.as_query_engine(&embedder, &llm, &QueryConfig::default());
        let response = engine.query("Anything?").unwrap();
        assert_eq!(response.response, EMPTY_RESPONSE);
    }

    #[test]
    fn test_llm_failure_propagates() {
        let embedder = embedder();
        let index = build_index(&[doc("france.txt", "Paris is the capital of France.")], &embedder);

        let mut llm = MockLlmProvider::new();
        llm.expect_complete()
            .returning(|_: &str| Err(Error::llm("model not found")));

        let engine = index.as_query_engine(&embedder, &llm, &QueryConfig::default());
        let err = engine.query("Where is Paris?").unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }
}
