//! In-memory HNSW vector store over text nodes

use hnsw_rs::hnsw::{Hnsw, Neighbour};
use hnsw_rs::prelude::*;

use crate::error::{Error, Result};
use crate::types::{NodeWithScore, TextNode};

const MAX_NB_CONNECTION: usize = 16;
const MAX_LAYER: usize = 16;
const EF_CONSTRUCTION: usize = 200;

/// Cosine-distance HNSW graph plus the nodes it points at.
///
/// Built once; searches never mutate it.
pub struct HnswVectorStore {
    hnsw: Hnsw<'static, f32, DistCosine>,
    /// HNSW data id `i` refers to `nodes[i]`
    nodes: Vec<TextNode>,
    dimensions: usize,
}

impl HnswVectorStore {
    /// Build the store from nodes and their embeddings
    pub fn build(entries: Vec<(TextNode, Vec<f32>)>) -> Result<Self> {
        let dimensions = entries.first().map(|(_, v)| v.len()).unwrap_or(0);

        for (node, vector) in &entries {
            if vector.len() != dimensions || dimensions == 0 {
                return Err(Error::embedding(format!(
                    "Node {} has {} dimensions, expected {}",
                    node.id,
                    vector.len(),
                    dimensions
                )));
            }
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(Error::embedding(format!(
                    "Node {} embedding contains NaN or Infinity",
                    node.id
                )));
            }
        }

        let mut hnsw: Hnsw<f32, DistCosine> = Hnsw::new(
            MAX_NB_CONNECTION,
            entries.len().max(1),
            MAX_LAYER,
            EF_CONSTRUCTION,
            DistCosine,
        );

        let mut nodes = Vec::with_capacity(entries.len());
        for (data_id, (node, vector)) in entries.into_iter().enumerate() {
            let normalized = normalize_vector(&vector);
            hnsw.insert((&normalized, data_id));
            nodes.push(node);
        }
        hnsw.set_searching_mode(true);

        tracing::debug!("Built HNSW index: {} nodes, {} dimensions", nodes.len(), dimensions);

        Ok(Self {
            hnsw,
            nodes,
            dimensions,
        })
    }

    /// Top `k` nodes by cosine similarity, best first
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<NodeWithScore>> {
        if self.nodes.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "Query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(Error::embedding("Query embedding contains NaN or Infinity"));
        }

        let k = k.min(self.nodes.len());
        let ef_search = (k * 2).max(50);
        let normalized = normalize_vector(query);
        let neighbours: Vec<Neighbour> = self.hnsw.search(&normalized, k, ef_search);

        let mut results: Vec<NodeWithScore> = neighbours
            .into_iter()
            .filter_map(|n| {
                self.nodes.get(n.d_id).map(|node| NodeWithScore {
                    node: node.clone(),
                    score: 1.0 - n.distance,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }

    /// Number of indexed nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node was indexed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Embedding dimensions (0 for an empty store)
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Scale to unit length; zero vectors are returned unchanged
fn normalize_vector(vector: &[f32]) -> Vec<f32> {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return vector.to_vec();
    }
    vector.iter().map(|x| x / magnitude).collect()
}
