//! Ask a question against the knowledge base.

use crate::config::DataPaths;
use anyhow::Result;
use colored::Colorize;
use triage::llm::{GeminiClient, PassthroughCompressor, ScaleDownClient};
use triage::prelude::*;

pub async fn run(paths: &DataPaths, query: &str, category: Option<Category>) -> Result<()> {
    let (store, retriever) = super::open(paths)?;

    let compressor: Box<dyn Compressor> = match ScaleDownClient::from_env() {
        Ok(client) => Box::new(client),
        Err(e) => {
            eprintln!("{} {e}, contexts will not be compressed", "note:".yellow());
            Box::new(PassthroughCompressor)
        }
    };
    let generator: Option<Box<dyn GenerationBackend>> = match GeminiClient::from_env() {
        Ok(client) => Some(Box::new(client)),
        Err(e) => {
            eprintln!(
                "{} {e}, running escalate-only (no answers will be generated)",
                "note:".yellow()
            );
            None
        }
    };

    let engine = DecisionEngine::new(retriever, store, compressor, generator);
    let decision = engine.decide(query, category).await;

    match decision.disposition {
        Disposition::Resolved => {
            println!("{}", decision.response);
        }
        Disposition::Security => {
            println!("{}", decision.response.red());
        }
        Disposition::LowConfidence | Disposition::GenerationInsufficient => {
            println!("{}", decision.response.yellow());
        }
    }

    if !decision.sources.is_empty() {
        println!();
        println!("{}", "Sources".blue().bold());
        for source in &decision.sources {
            println!(
                "  {} ({}) score {:.3}",
                source.title.cyan(),
                source.category,
                source.score
            );
        }
    }

    println!();
    println!(
        "confidence {:.2}%  coverage {} chars",
        decision.confidence * 100.0,
        decision.coverage
    );
    if let Some(ticket) = decision.ticket_id {
        println!("{} #{ticket}", "Ticket filed:".yellow().bold());
    }
    if let Some(metric) = decision.metric_id {
        println!(
            "metric #{metric} recorded (use {} to report the outcome)",
            format!("triage feedback {metric} solved").cyan()
        );
    }

    Ok(())
}
