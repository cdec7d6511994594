//! Domain types shared by the loader, the indexes and the chat pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub type NodeId = String;
pub type Meta = serde_json::Map<String, Value>;

pub const POSITION_KEY: &str = "position";
pub const FILE_NAME_KEY: &str = "file_name";
pub const FILE_PATH_KEY: &str = "file_path";
pub const TOPIC_KEY: &str = "topic";
pub const UNKNOWN_TOPIC: &str = "Unknown";

/// Raw parsed content of one source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: Meta,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: Meta::new() }
    }
}

/// Which metadata keys are visible when a node is rendered to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataMode {
    All,
    Embed,
    Llm,
    None,
}

/// A chunk of a source document that is independently indexed.
///
/// - `id`: `<document id>:<chunk index>`, unique within a run
/// - `ref_doc_id`: id of the document the chunk was cut from
/// - `metadata`: inherited document metadata plus annotation fields
///   (`position`, `file_name`, `file_path`, optional `topic`)
/// - `excluded_*_metadata_keys`: keys hidden from the matching render mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub ref_doc_id: Option<String>,
    pub text: String,
    pub metadata: Meta,
    pub excluded_llm_metadata_keys: Vec<String>,
    pub excluded_embed_metadata_keys: Vec<String>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), ..Self::default() }
    }

    /// Annotated position, if the node carries an integer one.
    pub fn position(&self) -> Option<i64> {
        self.metadata.get(POSITION_KEY).and_then(Value::as_i64)
    }

    /// Topic string, `"Unknown"` when absent or not a string.
    pub fn topic(&self) -> &str {
        self.metadata.get(TOPIC_KEY).and_then(Value::as_str).unwrap_or(UNKNOWN_TOPIC)
    }

    pub fn set_content(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Render the metadata lines visible in `mode`.
    pub fn metadata_str(&self, mode: MetadataMode) -> String {
        let excluded: &[String] = match mode {
            MetadataMode::All => &[],
            MetadataMode::Embed => &self.excluded_embed_metadata_keys,
            MetadataMode::Llm => &self.excluded_llm_metadata_keys,
            MetadataMode::None => return String::new(),
        };
        self.metadata
            .iter()
            .filter(|(k, _)| !excluded.iter().any(|e| e == *k))
            .map(|(k, v)| format!("{}: {}", k, display_value(v)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Node text prefixed by the metadata visible in `mode`.
    pub fn get_content(&self, mode: MetadataMode) -> String {
        let meta = self.metadata_str(mode);
        if meta.is_empty() { self.text.clone() } else { format!("{}\n\n{}", meta, self.text) }
    }
}

/// Render a metadata value the way it should appear to a reader: strings
/// without JSON quotes, everything else in its JSON form.
pub fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A retrieved node and its relevance score (higher is better).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeWithScore {
    pub node: Node,
    pub score: f32,
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Text,
}

/// The minimal surface returned by all engines.
///
/// `id` matches `Node::id`. `score` is engine-specific but
/// higher is always better. `source` labels the origin engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: NodeId,
    pub score: f32,
    pub source: SourceKind,
}

/// Synthesized answer plus the nodes it was built from.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub answer: Option<String>,
    pub source_nodes: Vec<NodeWithScore>,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.answer {
            Some(answer) => f.write_str(answer),
            None => f.write_str("Empty Response"),
        }
    }
}
