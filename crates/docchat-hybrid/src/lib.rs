//! docchat-hybrid
//!
//! Combines the tantivy keyword index and the in-memory vector index into one
//! node index, and hosts the query engine and the chat pipeline built on it.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;

use docchat_core::traits::{Embedder, TextIndexer, VectorIndexer, SearchEngine};
use docchat_core::types::{MetadataMode, Node, SearchHit, SourceKind};

pub mod chat;
pub mod index;
pub mod postprocessor;
pub mod query_engine;
pub mod synthesizer;

pub use chat::{AnswerReport, Chatbot, Outcome};
pub use index::{HybridIndexBuilder, VectorStoreIndex};
pub use postprocessor::MetadataReplacementPostProcessor;
pub use query_engine::RetrieverQueryEngine;
pub use synthesizer::CompactSynthesizer;

pub struct HybridSearchEngine<TI, VI> where TI: TextIndexer, VI: VectorIndexer {
    text: TI,
    vector: VI,
    embedder: Arc<dyn Embedder>,
}

impl<TI, VI> HybridSearchEngine<TI, VI> where TI: TextIndexer, VI: VectorIndexer {
    pub fn new(text: TI, vector: VI, embedder: Arc<dyn Embedder>) -> Self { Self { text, vector, embedder } }

    pub fn index(&self, nodes: &[Node]) -> Result<()> {
        // 1) embed
        let batch_texts: Vec<String> = nodes.iter().map(|n| n.get_content(MetadataMode::Embed)).collect();
        let embeddings = self.embedder.embed_batch(&batch_texts)?;
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.embedder.dim()) {
            return Err(anyhow!("embedder returned dim {}, expected {}", bad.len(), self.embedder.dim()));
        }
        // 2) vector index
        self.vector.index(nodes, &embeddings)?;
        // 3) text index
        self.text.index(nodes)
    }

    pub fn query(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let q_vec = self
            .embedder
            .embed_batch(&[query.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
        let mut dense_hits = self.vector.search_vec(&q_vec, k)?;
        for h in &mut dense_hits { h.source = SourceKind::Vector; }
        let mut text_hits = self.text.search(query, k)?;
        // BM25 is unbounded; scale into [0, 1] by the best text hit
        let best_text = text_hits.iter().map(|h| h.score).fold(0.0f32, f32::max);
        for h in &mut text_hits {
            h.source = SourceKind::Text;
            if best_text > 0.0 { h.score /= best_text; }
        }
        // merge unique ids, prioritize better score
        let mut by_id: HashMap<String, SearchHit> = HashMap::new();
        for h in dense_hits.into_iter().chain(text_hits) {
            by_id.entry(h.id.clone()).and_modify(|old| { if h.score > old.score { *old = h.clone(); } }).or_insert(h);
        }
        let mut merged: Vec<SearchHit> = by_id.into_values().collect();
        merged.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.id.cmp(&b.id))
        });
        merged.truncate(k);
        Ok(merged)
    }
}

impl<TI, VI> SearchEngine for HybridSearchEngine<TI, VI> where TI: TextIndexer, VI: VectorIndexer {
    fn index(&self, nodes: &[Node]) -> Result<()> { Self::index(self, nodes) }
    fn query(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> { Self::query(self, query, k) }
}
