use anyhow::{anyhow, Result};
use std::sync::RwLock;

use docchat_core::traits::VectorIndexer;
use docchat_core::types::{Node, SearchHit, SourceKind};

use crate::table::VectorTable;

pub struct InMemoryVectorIndex {
    table: RwLock<VectorTable>,
    min_score: f32,
}

impl InMemoryVectorIndex {
    /// Hits must score strictly above `min_score` to be returned.
    pub fn new(min_score: f32) -> Self {
        Self { table: RwLock::new(VectorTable::new()), min_score }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.table.read().map_err(|_| anyhow!("vector table lock poisoned"))?.len())
    }

    pub fn is_empty(&self) -> Result<bool> { Ok(self.len()? == 0) }
}

impl VectorIndexer for InMemoryVectorIndex {
    fn index(&self, nodes: &[Node], embeddings: &[Vec<f32>]) -> Result<()> {
        if nodes.len() != embeddings.len() {
            return Err(anyhow!("{} nodes but {} embeddings", nodes.len(), embeddings.len()));
        }
        let mut table = self.table.write().map_err(|_| anyhow!("vector table lock poisoned"))?;
        for (node, vector) in nodes.iter().zip(embeddings) {
            table.insert(node.id.clone(), vector.clone())?;
        }
        tracing::debug!(rows = table.len(), "vector table updated");
        Ok(())
    }

    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let table = self.table.read().map_err(|_| anyhow!("vector table lock poisoned"))?;
        if let Some(dim) = table.dim() {
            if dim != query_vec.len() {
                return Err(anyhow!("query has dim {}, table expects {}", query_vec.len(), dim));
            }
        }
        let mut hits: Vec<SearchHit> = table
            .rows()
            .iter()
            .map(|row| SearchHit { id: row.id.clone(), score: dot(&row.vector, query_vec), source: SourceKind::Vector })
            .filter(|h| h.score > self.min_score)
            .collect();
        // stable sort keeps insertion order among equal scores
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }
