//! Triage CLI - answer-or-escalate decision core for internal IT support.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::DataPaths;
use triage::prelude::*;

#[derive(Parser)]
#[command(name = "triage")]
#[command(author, version, about = "Triage - answer-or-escalate IT support assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory holding the database, index, and documents
    #[arg(long, global = true, default_value = "data")]
    data_dir: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question against the knowledge base
    Ask {
        /// The question to triage
        query: String,

        /// Restrict retrieval to one category
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Rebuild the knowledge base from documents and resolved tickets
    Rebuild {
        /// Skip folding resolved tickets into the knowledge base
        #[arg(long)]
        no_tickets: bool,
    },

    /// Manage support tickets
    Tickets {
        #[command(subcommand)]
        command: TicketCommands,
    },

    /// Record whether a past answer actually solved the problem
    Feedback {
        /// Metric id from the original answer
        metric_id: i64,

        /// "solved" or "unsolved"
        #[arg(value_parser = ["solved", "unsolved"])]
        outcome: String,
    },

    /// Show knowledge-base, ticket, and metric statistics
    Stats,
}

#[derive(Subcommand)]
enum TicketCommands {
    /// List tickets, newest first
    List {
        #[arg(short, long)]
        status: Option<TicketStatus>,

        #[arg(short, long)]
        category: Option<Category>,

        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Show one ticket with its notes
    Show {
        id: i64,
    },

    /// Change a ticket's status
    Status {
        id: i64,
        status: TicketStatus,
    },

    /// Change a ticket's priority
    Priority {
        id: i64,
        priority: Priority,
    },

    /// Assign a ticket
    Assign {
        id: i64,
        assignee: String,
    },

    /// Add an internal note
    Note {
        id: i64,
        note: String,

        #[arg(short, long, default_value = "agent")]
        author: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt::init();
    }
    let paths = DataPaths::new(&cli.data_dir);

    match cli.command {
        Commands::Ask { query, category } => commands::ask::run(&paths, &query, category).await,
        Commands::Rebuild { no_tickets } => commands::rebuild::run(&paths, !no_tickets).await,
        Commands::Tickets { command } => match command {
            TicketCommands::List {
                status,
                category,
                priority,
            } => commands::tickets::list(&paths, status, category, priority),
            TicketCommands::Show { id } => commands::tickets::show(&paths, id),
            TicketCommands::Status { id, status } => commands::tickets::set_status(&paths, id, status),
            TicketCommands::Priority { id, priority } => {
                commands::tickets::set_priority(&paths, id, priority)
            }
            TicketCommands::Assign { id, assignee } => {
                commands::tickets::assign(&paths, id, &assignee)
            }
            TicketCommands::Note { id, note, author } => {
                commands::tickets::note(&paths, id, &note, &author)
            }
        },
        Commands::Feedback { metric_id, outcome } => {
            commands::stats::feedback(&paths, metric_id, outcome == "solved")
        }
        Commands::Stats => commands::stats::run(&paths),
    }
}
