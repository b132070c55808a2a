//! Rebuild the knowledge base and retrieval index.

use crate::config::DataPaths;
use anyhow::{bail, Result};
use colored::Colorize;
use triage::engine::resolved_ticket_documents;
use triage::llm::{PassthroughCompressor, ScaleDownClient};
use triage::prelude::*;

pub async fn run(paths: &DataPaths, include_tickets: bool) -> Result<()> {
    let (store, retriever) = super::open(paths)?;

    let mut documents = load_documents(&paths.docs)?;
    if include_tickets {
        documents.extend(resolved_ticket_documents(&store)?);
    }
    if documents.is_empty() {
        bail!(
            "no documents found under {} and no resolved tickets to index",
            paths.docs.display()
        );
    }
    println!("Rebuilding knowledge base from {} documents...", documents.len());

    let compressor: Box<dyn Compressor> = match ScaleDownClient::from_env() {
        Ok(client) => Box::new(client),
        Err(e) => {
            eprintln!("{} {e}, storing documents uncompressed", "note:".yellow());
            Box::new(PassthroughCompressor)
        }
    };

    let pipeline = KbPipeline::new(store.clone(), retriever);
    let report = pipeline.rebuild(&documents, compressor.as_ref()).await?;

    println!(
        "{} {} chunks indexed",
        "Done:".green().bold(),
        report.chunks_indexed
    );
    for error in &report.errors {
        eprintln!("  {} {error}", "skipped:".yellow());
    }

    let (chunks, original, condensed) = store
        .kb_stats()
        .map_err(|e| anyhow::anyhow!("reading KB stats: {e}"))?;
    println!(
        "knowledge base: {chunks} chunks, {original} original tokens, {condensed} condensed tokens"
    );
    Ok(())
}
