//! Prompt templates for RAG generation

use crate::types::NodeWithScore;

/// Separator placed between retrieved nodes in the context block
const NODE_SEPARATOR: &str = "\n\n";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved nodes into a context block of at most `max_chars` characters.
    ///
    /// Nodes are taken best first; the node that crosses the budget is cut,
    /// later nodes are dropped.
    pub fn build_context(results: &[NodeWithScore], max_chars: usize) -> String {
        let mut context = String::new();
        let mut used = 0usize;

        for result in results {
            let separator_len = if context.is_empty() { 0 } else { NODE_SEPARATOR.len() };
            if used + separator_len >= max_chars {
                break;
            }

            let block = result.node.content_with_source();
            let remaining = max_chars - used - separator_len;
            let block_len = block.chars().count();

            if !context.is_empty() {
                context.push_str(NODE_SEPARATOR);
            }

            if block_len <= remaining {
                context.push_str(&block);
                used += separator_len + block_len;
            } else {
                tracing::debug!("Context budget reached; truncating node {}", result.node.id);
                context.extend(block.chars().take(remaining));
                break;
            }
        }

        context
    }

    /// Build the question-answering prompt
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            "Context information is below.\n\
             ---------------------\n\
             {context}\n\
             ---------------------\n\
             Given the context information and not prior knowledge, answer the query.\n\
             Query: {question}\n\
             Answer: ",
            context = context,
            question = question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, DocumentMetadata, FileType, TextNode};

    fn scored(name: &str, text: &str, score: f32) -> NodeWithScore {
        let doc = Document::new(
            text.to_string(),
            FileType::Txt,
            String::new(),
            DocumentMetadata {
                file_name: name.to_string(),
                ..Default::default()
            },
        );
        NodeWithScore {
            node: TextNode::new(&doc, text.to_string(), 0, text.len()),
            score,
        }
    }

    #[test]
    fn test_qa_prompt_layout() {
        let prompt = PromptBuilder::build_qa_prompt("What is X?", "X is Y.");
        assert_eq!(
            prompt,
            "Context information is below.\n---------------------\nX is Y.\n---------------------\n\
             Given the context information and not prior knowledge, answer the query.\n\
             Query: What is X?\nAnswer: "
        );
    }

    #[test]
    fn test_context_lists_sources_in_order() {
        let results = vec![scored("a.txt", "First.", 0.9), scored("b.txt", "Second.", 0.5)];
        let context = PromptBuilder::build_context(&results, 1000);
        assert_eq!(context, "file_name: a.txt\n\nFirst.\n\nfile_name: b.txt\n\nSecond.");
    }

    #[test]
    fn test_context_respects_budget() {
        let results = vec![scored("a.txt", "First.", 0.9), scored("b.txt", "Second.", 0.5)];
        let context = PromptBuilder::build_context(&results, 20);
        assert_eq!(context.chars().count(), 20);
        assert!(context.starts_with("file_name: a.txt"));
        assert!(!context.contains("b.txt"));
    }
}
