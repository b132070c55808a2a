//! Ticket queue management.

use crate::config::DataPaths;
use anyhow::{Context, Result};
use colored::Colorize;
use triage::prelude::*;

fn colored_status(status: TicketStatus) -> colored::ColoredString {
    match status {
        TicketStatus::Open => status.as_str().red(),
        TicketStatus::InProgress => status.as_str().yellow(),
        TicketStatus::Resolved => status.as_str().green(),
        TicketStatus::Closed => status.as_str().dimmed(),
    }
}

fn colored_priority(priority: Priority) -> colored::ColoredString {
    match priority {
        Priority::Critical => priority.as_str().red().bold(),
        Priority::High => priority.as_str().red(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::Low => priority.as_str().normal(),
    }
}

pub fn list(
    paths: &DataPaths,
    status: Option<TicketStatus>,
    category: Option<Category>,
    priority: Option<Priority>,
) -> Result<()> {
    let (store, _) = super::open(paths)?;
    let tickets = store
        .list_tickets(&TicketFilter {
            status,
            category,
            priority,
        })
        .context("listing tickets")?;

    if tickets.is_empty() {
        println!("No tickets match.");
        return Ok(());
    }
    for ticket in tickets {
        println!(
            "#{:<5} {:<12} {:<9} {:<15} {}",
            ticket.id,
            colored_status(ticket.status),
            colored_priority(ticket.priority),
            ticket.category.as_str(),
            ticket.summary
        );
    }
    Ok(())
}

pub fn show(paths: &DataPaths, id: i64) -> Result<()> {
    let (store, _) = super::open(paths)?;
    let ticket = store.get_ticket(id).with_context(|| format!("ticket #{id}"))?;

    println!("{} {}", format!("Ticket #{}", ticket.id).white().bold(), ticket.summary);
    println!("{}", "═".repeat(50).dimmed());
    println!("  Status:     {}", colored_status(ticket.status));
    println!("  Priority:   {}", colored_priority(ticket.priority));
    println!("  Category:   {}", ticket.category);
    println!("  Requester:  {} ({})", ticket.requester_name, ticket.department);
    println!("  Assignee:   {}", ticket.assignee);
    if !ticket.tags.is_empty() {
        println!("  Tags:       {}", ticket.tags.cyan());
    }
    println!("  Created:    {}", ticket.created_at);
    println!("  Updated:    {}", ticket.updated_at);
    if let Some(resolved_at) = &ticket.resolved_at {
        println!("  Resolved:   {}", resolved_at.green());
    }
    println!();
    println!("{}", ticket.description);

    let notes = store.ticket_notes(id).context("loading notes")?;
    if !notes.is_empty() {
        println!();
        println!("{}", "Notes".blue().bold());
        for note in notes {
            println!("  [{}] {}: {}", note.created_at.dimmed(), note.created_by.cyan(), note.note);
        }
    }
    Ok(())
}

pub fn set_status(paths: &DataPaths, id: i64, status: TicketStatus) -> Result<()> {
    let (store, _) = super::open(paths)?;
    store
        .update_ticket_status(id, status)
        .with_context(|| format!("ticket #{id}"))?;
    println!("Ticket #{id} is now {}", colored_status(status));
    Ok(())
}

pub fn set_priority(paths: &DataPaths, id: i64, priority: Priority) -> Result<()> {
    let (store, _) = super::open(paths)?;
    store
        .update_ticket_priority(id, priority)
        .with_context(|| format!("ticket #{id}"))?;
    println!("Ticket #{id} priority set to {}", colored_priority(priority));
    Ok(())
}

pub fn assign(paths: &DataPaths, id: i64, assignee: &str) -> Result<()> {
    let (store, _) = super::open(paths)?;
    store
        .assign_ticket(id, assignee)
        .with_context(|| format!("ticket #{id}"))?;
    println!("Ticket #{id} assigned to {}", assignee.cyan());
    Ok(())
}

pub fn note(paths: &DataPaths, id: i64, note: &str, author: &str) -> Result<()> {
    let (store, _) = super::open(paths)?;
    store
        .add_ticket_note(id, note, author)
        .with_context(|| format!("ticket #{id}"))?;
    println!("Note added to ticket #{id}");
    Ok(())
}
