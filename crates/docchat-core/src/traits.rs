use std::path::Path;

use crate::types::{Document, Node, NodeWithScore, Response, SearchHit};

pub trait DocumentReader: Send + Sync {
    fn load_data(&self, path: &Path) -> crate::error::Result<Vec<Document>>;
}

pub trait NodeParser: Send + Sync {
    fn get_nodes_from_documents(&self, documents: &[Document]) -> Vec<Node>;
}

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

pub trait TextIndexer: Send + Sync {
    fn index(&self, nodes: &[Node]) -> anyhow::Result<()>;
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

pub trait VectorIndexer: Send + Sync {
    fn index(&self, nodes: &[Node], embeddings: &[Vec<f32>]) -> anyhow::Result<()>;
    fn search_vec(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

pub trait SearchEngine: Send + Sync {
    fn index(&self, nodes: &[Node]) -> anyhow::Result<()>;
    fn query(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

pub trait Retriever {
    fn retrieve(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<NodeWithScore>>;
}

/// A built, read-only index together with the nodes it was built over.
pub trait NodeIndex: Retriever {
    fn nodes(&self) -> &[Node];
}

/// Builds a fresh index over a node set. There is no incremental update:
/// a different node set means a new index.
pub trait IndexBuilder {
    type Index: NodeIndex;
    fn build(&self, nodes: Vec<Node>) -> anyhow::Result<Self::Index>;
}

pub trait NodePostprocessor {
    fn postprocess(&self, nodes: Vec<NodeWithScore>) -> Vec<NodeWithScore>;
}

pub trait Synthesizer {
    fn synthesize(&self, query: &str, nodes: Vec<NodeWithScore>) -> anyhow::Result<Response>;
}
