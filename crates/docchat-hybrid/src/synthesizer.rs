use anyhow::Result;

use docchat_core::traits::Synthesizer;
use docchat_core::types::{MetadataMode, NodeWithScore, Response};

/// Extractive answer: the source texts joined by blank lines, capped at
/// `max_chars` characters.
#[derive(Debug, Clone)]
pub struct CompactSynthesizer {
    max_chars: usize,
}

impl CompactSynthesizer {
    pub fn new(max_chars: usize) -> Self { Self { max_chars } }
}

impl Default for CompactSynthesizer {
    fn default() -> Self { Self::new(2000) }
}

impl Synthesizer for CompactSynthesizer {
    fn synthesize(&self, query: &str, nodes: Vec<NodeWithScore>) -> Result<Response> {
        if nodes.is_empty() {
            return Ok(Response { answer: None, source_nodes: nodes });
        }
        let joined = nodes
            .iter()
            .map(|n| n.node.get_content(MetadataMode::None))
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        let answer = truncate_chars(&joined, self.max_chars);
        tracing::debug!(query, sources = nodes.len(), chars = answer.chars().count(), "answer synthesized");
        Ok(Response { answer: Some(answer), source_nodes: nodes })
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::types::Node;

    fn scored(text: &str) -> NodeWithScore { NodeWithScore { node: Node::new(text, text), score: 1.0 } }

    #[test]
    fn joins_sources_in_order() {
        let r = CompactSynthesizer::default().synthesize("q", vec![scored("first"), scored("second")]).expect("synth");
        assert_eq!(r.answer.as_deref(), Some("first\n\nsecond"));
        assert_eq!(r.source_nodes.len(), 2);
    }

    #[test]
    fn truncates_on_char_boundary() {
        let r = CompactSynthesizer::new(3).synthesize("q", vec![scored("héllo")]).expect("synth");
        assert_eq!(r.answer.as_deref(), Some("hél"));
    }

    #[test]
    fn no_sources_no_answer() {
        let r = CompactSynthesizer::default().synthesize("q", vec![]).expect("synth");
        assert!(r.answer.is_none());
        assert_eq!(r.to_string(), "Empty Response");
    }
}
