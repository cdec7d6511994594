//! The one-shot question/answer pipeline.
//!
//! `Start → QueryReceived → TopicLocated | NoTopic → Filtered → Grouped →
//! SubIndexed → Queried → Answered | NoResults`. Every terminal state writes
//! exactly one outcome block to the output.

use anyhow::{bail, Result};
use std::io::{BufRead, Write};

use docchat_core::config::{PostprocessSettings, RetrievalSettings};
use docchat_core::nodes::{filter_nodes, group_nodes};
use docchat_core::traits::{IndexBuilder, NodeIndex, Retriever, Synthesizer};
use docchat_core::types::{display_value, Node, FILE_NAME_KEY, FILE_PATH_KEY, POSITION_KEY};

use crate::postprocessor::MetadataReplacementPostProcessor;
use crate::query_engine::RetrieverQueryEngine;

/// Returned by the topic locator when nothing matches.
pub const NO_TOPIC: i64 = -1;

pub const PROMPT: &str = "Enter your query: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReport {
    pub answer: String,
    pub file_name: String,
    pub node_number: String,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NoTopic,
    NoResults,
    Answered(AnswerReport),
}

/// Position of the best match for `query`, or [`NO_TOPIC`].
pub fn get_topic_position<R: Retriever + ?Sized>(index: &R, query: &str, top_k: usize) -> Result<i64> {
    let retrieved = index.retrieve(query, top_k)?;
    Ok(retrieved.first().and_then(|n| n.node.position()).unwrap_or(NO_TOPIC))
}

/// Owns the full index for the lifetime of the process and answers queries
/// against per-query sub-indexes built by the same builder.
pub struct Chatbot<B: IndexBuilder, S: Synthesizer> {
    builder: B,
    index: B::Index,
    synthesizer: S,
    postprocessor: Option<MetadataReplacementPostProcessor>,
    retrieval: RetrievalSettings,
}

impl<B: IndexBuilder, S: Synthesizer> Chatbot<B, S> {
    pub fn new(
        builder: B,
        nodes: Vec<Node>,
        synthesizer: S,
        retrieval: RetrievalSettings,
        postprocess: &PostprocessSettings,
    ) -> Result<Self> {
        let index = builder.build(nodes)?;
        let postprocessor = postprocess
            .enabled
            .then(|| MetadataReplacementPostProcessor::new(postprocess.target_metadata_key.clone()));
        Ok(Self { builder, index, synthesizer, postprocessor, retrieval })
    }

    pub fn locate_topic(&self, query: &str) -> Result<i64> {
        get_topic_position(&self.index, query, self.retrieval.locate_top_k)
    }

    /// Prompt once on `out`, read one line from `input` and answer it.
    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<Outcome> {
        write!(out, "{}", PROMPT)?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no query received: input closed");
        }
        let query = line.trim_end_matches(['\r', '\n']);
        self.answer(query, out)
    }

    pub fn answer<W: Write>(&self, query: &str, out: &mut W) -> Result<Outcome> {
        let topic_position = self.locate_topic(query)?;
        if topic_position == NO_TOPIC {
            writeln!(out, "No matching documents found for the query.")?;
            writeln!(out, "No topic found matching the query. Please try a different query.")?;
            return Ok(Outcome::NoTopic);
        }
        tracing::debug!(topic_position, "topic located");

        let filtered_nodes = filter_nodes(self.index.nodes(), topic_position);

        // Not consumed by retrieval below; only reported.
        let grouped_nodes = group_nodes(&filtered_nodes);
        tracing::debug!(
            filtered = filtered_nodes.len(),
            topics = ?grouped_nodes.topics().collect::<Vec<_>>(),
            "filtered nodes grouped"
        );

        let new_index = self.builder.build(filtered_nodes)?;
        let mut engine = RetrieverQueryEngine::new(&new_index, &self.synthesizer, self.retrieval.answer_top_k);
        if let Some(pp) = &self.postprocessor {
            engine = engine.with_postprocessor(pp);
        }
        let response = engine.query(query)?;

        let Some(source) = response.source_nodes.first() else {
            writeln!(out, "No results found in the filtered nodes.")?;
            return Ok(Outcome::NoResults);
        };
        let node = &source.node;
        let file_path = if node.excluded_llm_metadata_keys.iter().any(|k| k == FILE_PATH_KEY) {
            metadata_or(node, FILE_PATH_KEY, "Unknown Path")
        } else {
            "No File Path".to_string()
        };
        let report = AnswerReport {
            answer: response.to_string(),
            file_name: metadata_or(node, FILE_NAME_KEY, "Unknown File"),
            node_number: metadata_or(node, POSITION_KEY, "Unknown Position"),
            file_path,
        };

        writeln!(out, "Answer: {}", report.answer)?;
        writeln!(out, "File Name: {}", report.file_name)?;
        writeln!(out, "Node Number: {}", report.node_number)?;
        writeln!(out, "File Path: {}", report.file_path)?;
        Ok(Outcome::Answered(report))
    }
}

fn metadata_or(node: &Node, key: &str, default: &str) -> String {
    node.metadata.get(key).map(display_value).unwrap_or_else(|| default.to_string())
}
