use docchat_core::traits::NodePostprocessor;
use docchat_core::types::{display_value, NodeWithScore};

/// Replaces each retrieved node's text with the value of one metadata key.
/// Nodes without the key keep their text.
#[derive(Debug, Clone)]
pub struct MetadataReplacementPostProcessor {
    target_metadata_key: String,
}

impl MetadataReplacementPostProcessor {
    pub fn new(target_metadata_key: impl Into<String>) -> Self {
        Self { target_metadata_key: target_metadata_key.into() }
    }
}

impl NodePostprocessor for MetadataReplacementPostProcessor {
    fn postprocess(&self, mut nodes: Vec<NodeWithScore>) -> Vec<NodeWithScore> {
        for n in &mut nodes {
            if let Some(value) = n.node.metadata.get(&self.target_metadata_key) {
                let replacement = display_value(value);
                n.node.set_content(replacement);
            }
        }
        nodes
    }
}
