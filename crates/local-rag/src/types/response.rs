//! Response types for RAG queries

use serde::{Deserialize, Serialize};
use std::fmt;

use super::document::TextNode;

/// Answer text returned when retrieval finds nothing
pub const EMPTY_RESPONSE: &str = "Empty Response";

/// A retrieved node and its similarity to the question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeWithScore {
    /// The retrieved node
    pub node: TextNode,
    /// Cosine similarity (higher is better)
    pub score: f32,
}

/// Generated answer plus the nodes it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer text
    pub response: String,
    /// Retrieved context, best match first
    pub source_nodes: Vec<NodeWithScore>,
}

impl QueryResponse {
    /// Create a response
    pub fn new(response: String, source_nodes: Vec<NodeWithScore>) -> Self {
        Self {
            response,
            source_nodes,
        }
    }

    /// Response for a question with no retrievable context
    pub fn empty() -> Self {
        Self::new(EMPTY_RESPONSE.to_string(), Vec::new())
    }

    /// One line per source node: `Source [1]: notes.txt (score: 0.83)`
    pub fn format_sources(&self) -> Vec<String> {
        self.source_nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                format!(
                    "Source [{}]: {} (score: {:.2})",
                    i + 1,
                    n.node.metadata.source_label(),
                    n.score
                )
            })
            .collect()
    }
}

impl fmt::Display for QueryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, DocumentMetadata, FileType};

    #[test]
    fn test_display_is_answer_only() {
        let doc = Document::new(
            "Paris is the capital of France.".to_string(),
            FileType::Txt,
            String::new(),
            DocumentMetadata {
                file_name: "france.txt".to_string(),
                ..Default::default()
            },
        );
        let node = TextNode::new(&doc, doc.text.clone(), 0, doc.text.len());
        let response = QueryResponse::new(
            "Paris.".to_string(),
            vec![NodeWithScore { node, score: 0.912 }],
        );

        assert_eq!(response.to_string(), "Paris.");
        assert_eq!(response.format_sources(), vec!["Source [1]: france.txt (score: 0.91)"]);
    }

    #[test]
    fn test_empty_response() {
        let response = QueryResponse::empty();
        assert_eq!(response.to_string(), EMPTY_RESPONSE);
        assert!(response.source_nodes.is_empty());
    }
}
