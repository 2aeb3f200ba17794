//! Query engine: retrieval plus answer generation

mod engine;
mod prompt;

pub use engine::{QueryEngine, RetrieverQueryEngine};
pub use prompt::PromptBuilder;

#[cfg(test)]
pub use engine::MockQueryEngine;
