use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

pub const TOKENIZER_NAME: &str = "docchat_text";

/// English function words dropped at index and query time.
const STOP_WORDS: &[&str] = &[
	"a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "could", "did", "do", "does",
	"for", "from", "had", "has", "have", "having", "he", "how", "if", "in", "is", "it", "its",
	"may", "might", "must", "not", "of", "on", "or", "shall", "should", "so", "than", "that",
	"the", "their", "them", "then", "there", "these", "they", "this", "to", "was", "what", "when",
	"where", "which", "who", "whom", "whose", "why", "will", "with", "would",
];

/// Handles to the fields of a node document.
#[derive(Debug, Clone, Copy)]
pub struct NodeFields {
	pub id: Field,
	pub ref_doc_id: Field,
	/// Embed-mode content; indexed with positions, never stored.
	pub text: Field,
}

pub fn build_schema() -> (Schema, NodeFields) {
	let mut builder = Schema::builder();
	let id = builder.add_text_field("id", STRING | STORED);
	let ref_doc_id = builder.add_text_field("ref_doc_id", STRING | STORED);
	let indexing = TextFieldIndexing::default()
		.set_tokenizer(TOKENIZER_NAME)
		.set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text = builder.add_text_field("text", TextOptions::default().set_indexing_options(indexing));
	(builder.build(), NodeFields { id, ref_doc_id, text })
}

pub fn register_tokenizer(index: &Index) {
	let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(STOP_WORDS.iter().map(|w| (*w).to_string())))
		.build();
	index.tokenizers().register(TOKENIZER_NAME, analyzer);
}
