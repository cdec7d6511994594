use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::traits::DocumentReader;
use crate::types::Document;

const WORD_EXTENSIONS: [&str; 2] = [".docx", ".doc"];

/// Loads every Word document found directly inside one directory.
///
/// Entries are visited in directory-listing order. A file that fails to
/// parse is reported and skipped; it never aborts the scan.
pub struct DirectoryLoader<R: DocumentReader> {
    data_dir: PathBuf,
    reader: R,
}

impl<R: DocumentReader> DirectoryLoader<R> {
    pub fn new(data_dir: impl Into<PathBuf>, reader: R) -> Self {
        Self { data_dir: data_dir.into(), reader }
    }

    pub fn load(&self) -> Result<Vec<Document>> {
        println!("Checking files in: {}", self.data_dir.display());
        let mut documents = Vec::new();
        let entries = walkdir::WalkDir::new(&self.data_dir).min_depth(1).max_depth(1);
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to list {}", self.data_dir.display()))?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            println!("Found file: {}", file_name);
            if !is_word_file(&file_name) { continue; }
            let file_path = entry.path();
            match self.reader.load_data(file_path) {
                Ok(docs) => {
                    documents.extend(docs);
                    println!("Processed file: {}", file_path.display());
                }
                Err(e) => {
                    tracing::warn!(path = %file_path.display(), error = %e, "skipping unreadable document");
                    println!("Error processing {}: {}", file_path.display(), e);
                }
            }
        }
        tracing::debug!(count = documents.len(), "documents loaded");
        Ok(documents)
    }
}

/// True for names ending in `.docx` or `.doc` (case-sensitive, like the listing).
pub fn is_word_file(name: &str) -> bool {
    WORD_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}
