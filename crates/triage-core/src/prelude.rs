//! Triage Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use triage_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{
    Category, ChatMetric, Chunk, ChunkId, Decision, Disposition, MetricDraft, MetricId, Priority,
    RetrievedChunk, SourceRef, Ticket, TicketDraft, TicketId, TicketNote, TicketStatus,
};

// Re-export error types
pub use crate::error::{ConfigError, IndexError, Result, TriageError};
