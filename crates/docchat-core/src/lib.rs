//! docchat-core
//!
//! Domain types, capability traits, configuration, the Word document loader,
//! the sentence splitter and the position bookkeeping used by the chat
//! pipeline.

#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod docx;
pub mod error;
pub mod loader;
pub mod node_parser;
pub mod nodes;
pub mod traits;
pub mod types;
