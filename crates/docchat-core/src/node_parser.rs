use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::traits::NodeParser;
use crate::types::{Document, Node};

/// Splits documents into nodes along paragraph and sentence boundaries.
///
/// Sizes are approximate tokens (`words / 0.75`). Each chunk stays within
/// `chunk_size`; consecutive chunks share trailing splits worth at most
/// `chunk_overlap` tokens.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    config: ChunkingConfig,
}

#[derive(Debug, Clone)]
struct Split {
    text: String,
    tokens: usize,
}

impl Default for SentenceSplitter {
    fn default() -> Self { Self { config: ChunkingConfig::default() } }
}

impl SentenceSplitter {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        if config.chunk_size == 0 || config.chunk_overlap >= config.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than a non-zero chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self { config })
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let splits = self.collect_splits(text);
        self.merge_splits(splits)
    }

    fn collect_splits(&self, text: &str) -> Vec<Split> {
        let mut splits = Vec::new();
        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() { continue; }
            for sentence in split_sentences(paragraph) {
                let tokens = count_tokens(&sentence);
                if tokens <= self.config.chunk_size {
                    splits.push(Split { text: sentence, tokens });
                } else {
                    splits.extend(self.split_words(&sentence));
                }
            }
        }
        splits
    }

    fn split_words(&self, sentence: &str) -> Vec<Split> {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        // largest word count whose token estimate still fits
        let words_per_chunk = ((self.config.chunk_size as f32 * 0.75) as usize).max(1);
        words
            .chunks(words_per_chunk)
            .map(|w| {
                let text = w.join(" ");
                let tokens = count_tokens(&text);
                Split { text, tokens }
            })
            .collect()
    }

    fn merge_splits(&self, splits: Vec<Split>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<Split> = Vec::new();
        let mut current_tokens = 0usize;
        let mut fresh = 0usize;

        for split in splits {
            if current_tokens + split.tokens > self.config.chunk_size && fresh > 0 {
                chunks.push(join_splits(&current));
                fresh = 0;
                // keep the tail as overlap for the next chunk
                while !current.is_empty()
                    && (current_tokens > self.config.chunk_overlap
                        || current_tokens + split.tokens > self.config.chunk_size)
                {
                    let dropped = current.remove(0);
                    current_tokens -= dropped.tokens;
                }
            }
            current_tokens += split.tokens;
            current.push(split);
            fresh += 1;
        }
        if fresh > 0 { chunks.push(join_splits(&current)); }
        chunks
    }
}

impl NodeParser for SentenceSplitter {
    fn get_nodes_from_documents(&self, documents: &[Document]) -> Vec<Node> {
        let mut nodes = Vec::new();
        for doc in documents {
            for (chunk_index, chunk) in self.split_text(&doc.text).into_iter().enumerate() {
                let mut node = Node::new(format!("{}:{}", doc.id, chunk_index), chunk);
                node.ref_doc_id = Some(doc.id.clone());
                node.metadata = doc.metadata.clone();
                nodes.push(node);
            }
        }
        tracing::debug!(documents = documents.len(), nodes = nodes.len(), "documents split into nodes");
        nodes
    }
}

pub fn count_tokens(text: &str) -> usize {
    let word_count = text.split_whitespace().count();
    (word_count as f32 / 0.75) as usize
}

/// Sentences end at `.`, `!` or `?` followed by whitespace; the terminator
/// stays with its sentence.
fn split_sentences(paragraph: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let end = i + c.len_utf8();
                    let sentence = paragraph[start..end].trim();
                    if !sentence.is_empty() { sentences.push(sentence.to_string()); }
                    start = end;
                }
            }
        }
    }
    let tail = paragraph[start..].trim();
    if !tail.is_empty() { sentences.push(tail.to_string()); }
    sentences
}

fn join_splits(splits: &[Split]) -> String {
    splits.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ")
}
