use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docchat_core::config::{expand_path, Config};
use docchat_core::docx::DocxReader;
use docchat_core::loader::DirectoryLoader;
use docchat_core::node_parser::SentenceSplitter;
use docchat_core::nodes::annotate_nodes;
use docchat_core::traits::NodeParser;
use docchat_embed::get_default_embedder;
use docchat_hybrid::{Chatbot, CompactSynthesizer, HybridIndexBuilder};

/// Ask one question against a folder of Word documents.
#[derive(Parser, Debug)]
#[command(name = "docchat", version, about)]
struct Cli {
    /// Folder with .docx files (defaults to data.docs_dir from the config)
    data_dir: Option<String>,

    /// Answer this query instead of prompting on stdin
    #[arg(short, long)]
    query: Option<String>,

    /// Config environment (overrides RUST_ENV)
    #[arg(long)]
    env: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the conversation, logs go to stderr
    let filter = if cli.verbose { "docchat=debug" } else { "docchat=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = match &cli.env {
        Some(env) => Config::load_for_env(env),
        None => Config::load(),
    }
    .map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;

    let data_dir = expand_path(cli.data_dir.as_deref().unwrap_or(&settings.data.docs_dir));
    let documents = DirectoryLoader::new(data_dir, DocxReader::new()).load()?;
    if documents.is_empty() {
        println!("No documents found. Please check the folder path and file contents.");
    } else {
        println!("Loaded {} documents.", documents.len());
    }

    let splitter = SentenceSplitter::new(settings.chunking.clone())?;
    let mut nodes = splitter.get_nodes_from_documents(&documents);
    annotate_nodes(&mut nodes);
    tracing::info!(documents = documents.len(), nodes = nodes.len(), "corpus parsed");

    let embedder = get_default_embedder(&settings.embedding)?;
    let builder = HybridIndexBuilder::new(embedder, settings.retrieval.min_vector_score);
    let chatbot = Chatbot::new(
        builder,
        nodes,
        CompactSynthesizer::new(settings.synthesis.max_chars),
        settings.retrieval.clone(),
        &settings.postprocess,
    )?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &cli.query {
        Some(query) => chatbot.answer(query, &mut out)?,
        None => chatbot.run(&mut io::stdin().lock(), &mut out)?,
    };
    Ok(())
}
