//! Knowledge-base, ticket, and metric statistics.

use crate::config::DataPaths;
use anyhow::{Context, Result};
use colored::Colorize;

pub fn run(paths: &DataPaths) -> Result<()> {
    let (store, retriever) = super::open(paths)?;

    let (chunks, original_tokens, condensed_tokens) =
        store.kb_stats().context("reading KB stats")?;
    let tickets = store.ticket_stats().context("reading ticket stats")?;
    let metrics = store.aggregate_metrics().context("reading metric stats")?;

    println!("{}", "Triage Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Knowledge Base".blue().bold());
    println!("  Chunks:            {}", chunks.to_string().cyan());
    println!("  Original tokens:   {original_tokens}");
    println!("  Condensed tokens:  {condensed_tokens}");
    let categories = retriever.list_categories();
    if !categories.is_empty() {
        let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
        println!("  Categories:        {}", names.join(", "));
    }
    println!();

    println!("{}", "Tickets".blue().bold());
    println!("  Total:             {}", tickets.total.to_string().cyan());
    println!("  Open:              {}", tickets.open.to_string().red());
    println!("  In progress:       {}", tickets.in_progress.to_string().yellow());
    println!("  Resolved:          {}", tickets.resolved.to_string().green());
    println!("  Closed:            {}", tickets.closed);
    println!();

    println!("{}", "Queries".blue().bold());
    println!("  Total:             {}", metrics.queries.to_string().cyan());
    println!("  With outcome:      {}", metrics.with_outcome);
    println!("  Reported solved:   {}", metrics.resolved.to_string().green());
    println!("  Escalated:         {}", metrics.escalated_to_ticket.to_string().yellow());
    println!("  Avg compression:   {:.2}", metrics.avg_compression_ratio);
    println!("  Avg generation:    {:.0} ms", metrics.avg_generation_latency_ms);

    println!();
    println!("{}", "═".repeat(40).dimmed());
    Ok(())
}

pub fn feedback(paths: &DataPaths, metric_id: i64, solved: bool) -> Result<()> {
    let (store, _) = super::open(paths)?;
    store
        .mark_metric_resolved(metric_id, solved)
        .with_context(|| format!("metric #{metric_id}"))?;
    let label = if solved { "solved".green() } else { "unsolved".yellow() };
    println!("Recorded metric #{metric_id} as {label}");
    Ok(())
}
