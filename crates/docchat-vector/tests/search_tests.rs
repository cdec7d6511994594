use docchat_core::traits::{Embedder, VectorIndexer};
use docchat_core::types::Node;
use docchat_embed::HashEmbedder;
use docchat_vector::InMemoryVectorIndex;

fn corpus() -> Vec<Node> {
    vec![
        Node::new("n:0", "goats need shelter from rain"),
        Node::new("n:1", "solar panels charge slowly in winter"),
        Node::new("n:2", "the battery bank needs a charge controller"),
    ]
}

fn indexed(min_score: f32) -> (HashEmbedder, InMemoryVectorIndex) {
    let embedder = HashEmbedder::new(4096).expect("embedder");
    let index = InMemoryVectorIndex::new(min_score);
    let nodes = corpus();
    let texts: Vec<String> = nodes.iter().map(|n| n.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).expect("embed");
    index.index(&nodes, &embeddings).expect("index");
    (embedder, index)
}

#[test]
fn ranks_by_cosine_and_limits() {
    let (embedder, index) = indexed(0.0);
    assert_eq!(index.len().expect("len"), 3);
    let q = embedder.embed_text("battery bank charge controller");
    let hits = index.search_vec(&q, 2).expect("search");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "n:2");
    assert_eq!(hits[1].id, "n:1");
    assert!(hits[0].score >= hits[1].score);
}

#[test]
fn min_score_filters_weak_hits() {
    let (embedder, index) = indexed(0.99);
    let q = embedder.embed_text("goats");
    assert!(index.search_vec(&q, 5).expect("search").is_empty());
}

#[test]
fn mismatched_lengths_are_rejected() {
    let index = InMemoryVectorIndex::new(0.0);
    assert!(index.index(&corpus(), &[vec![1.0]]).is_err());
    assert!(index.is_empty().expect("empty"));
    index.index(&corpus()[..1], &[vec![1.0, 0.0]]).expect("index");
    assert!(index.search_vec(&[1.0, 0.0, 0.0], 1).is_err());
}
