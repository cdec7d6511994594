//! docchat-vector
//!
//! In-memory vector table and brute-force cosine search. Vectors are
//! expected to be L2-normalised, so cosine similarity is a dot product.

pub mod search;
pub mod table;

pub use search::InMemoryVectorIndex;
pub use table::{VectorRow, VectorTable};
