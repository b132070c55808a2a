//! # Triage Core
//!
//! Shared types and errors for the triage decision core.
//!
//! The triage system answers internal support questions from a curated
//! knowledge base and escalates to human-tracked ticketing when it cannot
//! answer safely. This crate defines the vocabulary every other crate
//! speaks:
//!
//! - **Chunk** — a condensed, titled, categorized unit of knowledge-base
//!   content
//! - **Category** — the fixed set of support categories
//! - **Decision** / **Disposition** — the terminal outcome of one query
//! - **Ticket** / **TicketDraft** — the human-tracked escalation record
//! - **ChatMetric** — the per-query metrics row
//!
//! ## Quick Start
//!
//! ```rust
//! use triage_core::prelude::*;
//!
//! let draft = TicketDraft::new("VPN not connecting", "Cannot connect from home")
//!     .with_category(Category::Network)
//!     .with_priority(Priority::High);
//! assert_eq!(draft.priority, Priority::High);
//! ```

pub mod error;
pub mod prelude;
pub mod types;
