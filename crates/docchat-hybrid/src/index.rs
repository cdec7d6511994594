use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use docchat_core::traits::{Embedder, IndexBuilder, NodeIndex, Retriever, SearchEngine};
use docchat_core::types::{Node, NodeId, NodeWithScore};
use docchat_text::TantivyIndexer;
use docchat_vector::InMemoryVectorIndex;

use crate::HybridSearchEngine;

/// Node store plus the search engine built over it. Read-only once built.
pub struct VectorStoreIndex<E: SearchEngine> {
    nodes: Vec<Node>,
    slots: HashMap<NodeId, usize>,
    engine: E,
}

impl<E: SearchEngine> VectorStoreIndex<E> {
    pub fn new(nodes: Vec<Node>, engine: E) -> Result<Self> {
        engine.index(&nodes)?;
        let slots = nodes.iter().enumerate().map(|(i, n)| (n.id.clone(), i)).collect();
        Ok(Self { nodes, slots, engine })
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.slots.get(id).map(|&i| &self.nodes[i])
    }
}

impl<E: SearchEngine> Retriever for VectorStoreIndex<E> {
    fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<NodeWithScore>> {
        if self.nodes.is_empty() { return Ok(Vec::new()); }
        let hits = self.engine.query(query, top_k)?;
        let mut out = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.get(&hit.id) {
                Some(node) => out.push(NodeWithScore { node: node.clone(), score: hit.score }),
                None => tracing::warn!(id = %hit.id, "search hit without a stored node"),
            }
        }
        Ok(out)
    }
}

impl<E: SearchEngine> NodeIndex for VectorStoreIndex<E> {
    fn nodes(&self) -> &[Node] { &self.nodes }
}

pub type HybridIndex = VectorStoreIndex<HybridSearchEngine<TantivyIndexer, InMemoryVectorIndex>>;

/// Builds a fresh in-memory hybrid index for every node set.
#[derive(Clone)]
pub struct HybridIndexBuilder {
    embedder: Arc<dyn Embedder>,
    min_vector_score: f32,
}

impl HybridIndexBuilder {
    pub fn new(embedder: Arc<dyn Embedder>, min_vector_score: f32) -> Self {
        Self { embedder, min_vector_score }
    }
}

impl IndexBuilder for HybridIndexBuilder {
    type Index = HybridIndex;

    fn build(&self, nodes: Vec<Node>) -> Result<Self::Index> {
        let count = nodes.len();
        let engine = HybridSearchEngine::new(
            TantivyIndexer::in_ram()?,
            InMemoryVectorIndex::new(self.min_vector_score),
            Arc::clone(&self.embedder),
        );
        let index = VectorStoreIndex::new(nodes, engine)?;
        tracing::debug!(nodes = count, "hybrid index built");
        Ok(index)
    }
}
