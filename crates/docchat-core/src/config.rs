//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `docchat.toml` +
//! `docchat.<env>.toml` + `DOCCHAT_*` env vars (`__` separates nested keys).
//! `expand_path` handles `~` and `${VAR}` in user-supplied paths.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub docs_dir: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { docs_dir: "data/transcribed_data".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1024, chunk_overlap: 200 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { dim: 1024 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Candidates fetched when locating the topic position.
    pub locate_top_k: usize,
    /// Candidates fetched from the filtered sub-index when answering.
    pub answer_top_k: usize,
    /// Vector hits must score strictly above this to be returned.
    pub min_vector_score: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { locate_top_k: 1, answer_top_k: 2, min_vector_score: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessSettings {
    pub enabled: bool,
    pub target_metadata_key: String,
}

impl Default for PostprocessSettings {
    fn default() -> Self {
        Self { enabled: true, target_metadata_key: crate::types::TOPIC_KEY.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    pub max_chars: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self { max_chars: 2000 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub postprocess: PostprocessSettings,
    pub synthesis: SynthesisSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be > 0".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be > 0".into()));
        }
        if self.retrieval.locate_top_k == 0 || self.retrieval.answer_top_k == 0 {
            return Err(Error::InvalidConfig("retrieval top_k values must be > 0".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("docchat.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("docchat.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("docchat.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("docchat.test.toml")),
            other => tracing::debug!(env = other, "no environment-specific config file"),
        }
        figment = figment.merge(Env::prefixed("DOCCHAT_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.retrieval.answer_top_k, 2);
        assert_eq!(s.postprocess.target_metadata_key, "topic");
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let mut s = Settings::default();
        s.chunking.chunk_overlap = s.chunking.chunk_size;
        assert!(matches!(s.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn expands_env_vars() {
        std::env::set_var("DOCCHAT_TEST_ROOT", "/srv/docchat");
        assert_eq!(expand_path("${DOCCHAT_TEST_ROOT}/docs"), PathBuf::from("/srv/docchat/docs"));
        assert_eq!(expand_path("plain/dir"), PathBuf::from("plain/dir"));
    }
}
