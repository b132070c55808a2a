//! SQLite persistence for the triage decision core.
//!
//! One database file holds the condensed knowledge base, the ticket queue,
//! and per-interaction chat metrics. The connection runs in WAL mode behind
//! a mutex; [`TriageStore`] is cheap to clone and share across threads.

mod chunks;
mod metrics;
mod store;
mod tickets;

pub use metrics::MetricAggregate;
pub use store::TriageStore;
pub use tickets::{TicketFilter, TicketStats};
