use anyhow::Result;

use docchat_core::traits::{NodePostprocessor, Retriever, Synthesizer};
use docchat_core::types::Response;

/// Retrieve, post-process in order, then synthesize.
pub struct RetrieverQueryEngine<'a> {
    retriever: &'a dyn Retriever,
    synthesizer: &'a dyn Synthesizer,
    postprocessors: Vec<&'a dyn NodePostprocessor>,
    top_k: usize,
}

impl<'a> RetrieverQueryEngine<'a> {
    pub fn new(retriever: &'a dyn Retriever, synthesizer: &'a dyn Synthesizer, top_k: usize) -> Self {
        Self { retriever, synthesizer, postprocessors: Vec::new(), top_k }
    }

    pub fn with_postprocessor(mut self, postprocessor: &'a dyn NodePostprocessor) -> Self {
        self.postprocessors.push(postprocessor);
        self
    }

    pub fn query(&self, query: &str) -> Result<Response> {
        let mut nodes = self.retriever.retrieve(query, self.top_k)?;
        for p in &self.postprocessors {
            nodes = p.postprocess(nodes);
        }
        self.synthesizer.synthesize(query, nodes)
    }
}
