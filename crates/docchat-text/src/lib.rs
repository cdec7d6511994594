//! docchat-text
//!
//! Tantivy-based keyword index over nodes, held in RAM for the lifetime of
//! one index build.

pub mod tantivy_utils;
pub mod index;

pub use index::TantivyIndexer;
