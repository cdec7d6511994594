//! docchat-embed
//!
//! Offline text embeddings by feature hashing: every lowercase alphanumeric
//! token is hashed (xxHash64) into one of `dim` buckets, and the vector is
//! L2-normalised. Texts sharing no tokens only overlap on bucket collisions.

use anyhow::{anyhow, Result};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use twox_hash::XxHash64;

use docchat_core::config::EmbeddingSettings;
use docchat_core::traits::Embedder;

pub struct HashEmbedder { dim: usize }

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 { return Err(anyhow!("embedding dimension must be > 0")); }
        Ok(Self { dim })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in tokens(text).enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += 0.5 + val * 0.5 + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        v
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    tracing::debug!(dim = settings.dim, "using hash embedder");
    Ok(Arc::new(HashEmbedder::new(settings.dim)?))
}
