use anyhow::Result;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};

use docchat_core::traits::TextIndexer;
use docchat_core::types::{MetadataMode, Node, SearchHit, SourceKind};

use crate::tantivy_utils::{build_schema, register_tokenizer, NodeFields, TOKENIZER_NAME};

/// BM25 keyword index over node content, stored in a RAM directory.
pub struct TantivyIndexer {
	index: Index,
	fields: NodeFields,
}

impl TantivyIndexer {
	pub fn in_ram() -> Result<Self> {
		let (schema, fields) = build_schema();
		let index = Index::create_in_ram(schema);
		register_tokenizer(&index);
		Ok(Self { index, fields })
	}

	pub fn num_docs(&self) -> Result<u64> {
		Ok(self.reader()?.searcher().num_docs())
	}

	fn reader(&self) -> Result<IndexReader> {
		Ok(self.index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?)
	}

	/// True when the text analyzer keeps at least one term of `query`.
	/// A query of stop words only parses to match-all, so it must be caught here.
	fn has_terms(&self, query: &str) -> bool {
		let Some(mut analyzer) = self.index.tokenizers().get(TOKENIZER_NAME) else {
			return true;
		};
		let mut stream = analyzer.token_stream(query);
		stream.advance()
	}
}

impl TextIndexer for TantivyIndexer {
	fn index(&self, nodes: &[Node]) -> Result<()> {
		let mut index_writer: IndexWriter = self.index.writer_with_num_threads(1, 50_000_000)?;
		for n in nodes {
			index_writer.add_document(doc!(
				self.fields.id => n.id.clone(),
				self.fields.ref_doc_id => n.ref_doc_id.clone().unwrap_or_default(),
				self.fields.text => n.get_content(MetadataMode::Embed),
			))?;
		}
		index_writer.commit()?;
		tracing::debug!(nodes = nodes.len(), "text index committed");
		Ok(())
	}

	fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
		if k == 0 || !self.has_terms(query) { return Ok(Vec::new()); }
		let searcher = self.reader()?.searcher();
		let parser = QueryParser::for_index(&self.index, vec![self.fields.text]);
		// free text from the prompt: tolerate stray query syntax
		let (parsed, errors) = parser.parse_query_lenient(query);
		if !errors.is_empty() { tracing::debug!(?errors, "query parsed leniently"); }
		let ranked = searcher.search(&parsed, &TopDocs::with_limit(k))?;
		let mut hits = Vec::with_capacity(ranked.len());
		for (score, address) in ranked {
			let stored: TantivyDocument = searcher.doc(address)?;
			match stored.get_first(self.fields.id).and_then(|v| v.as_str()) {
				Some(id) => hits.push(SearchHit { id: id.to_string(), score, source: SourceKind::Text }),
				None => tracing::warn!(?address, "text hit without a stored id"),
			}
		}
		Ok(hits)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_index_has_no_hits() {
		let indexer = TantivyIndexer::in_ram().expect("indexer");
		indexer.index(&[]).expect("index");
		assert_eq!(indexer.num_docs().expect("count"), 0);
		assert!(indexer.search("anything", 5).expect("search").is_empty());
	}

	#[test]
	fn stray_syntax_does_not_fail() {
		let indexer = TantivyIndexer::in_ram().expect("indexer");
		indexer.index(&[Node::new("a:0", "rain barrels collect water")]).expect("index");
		assert!(indexer.search("water AND (", 5).is_ok());
	}

	#[test]
	fn multi_word_stop_word_queries_match_nothing() {
		let indexer = TantivyIndexer::in_ram().expect("indexer");
		indexer.index(&[Node::new("a:0", "the history of the well"), Node::new("a:1", "how to dig")]).expect("index");
		for q in ["of the", "how to", "what is the", "  "] {
			assert!(indexer.search(q, 5).expect("search").is_empty(), "query {:?} matched", q);
		}
		assert_eq!(indexer.search("the well", 5).expect("search").len(), 1);
	}
}
