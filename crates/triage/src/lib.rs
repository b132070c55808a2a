//! # Triage
//!
//! An answer-or-escalate decision core for internal IT support. Queries run
//! through three layered gates: a security red-flag screen, retrieval
//! confidence and coverage thresholds over a TF-IDF knowledge index, and
//! the generator's own insufficiency signal. Only a query that clears all
//! three is answered from the knowledge base; everything else escalates to
//! a human with a support ticket.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use triage::prelude::*;
//! use triage_llm::{MockGenerator, PassthroughCompressor};
//!
//! # async fn run() -> Result<()> {
//! let store = TriageStore::open("triage.db").map_err(|e| TriageError::store(e.to_string()))?;
//! let retriever = Arc::new(Retriever::new(Box::new(store.clone()), "index.json"));
//!
//! let engine = DecisionEngine::new(
//!     retriever,
//!     store,
//!     Box::new(PassthroughCompressor),
//!     Some(Box::new(MockGenerator::new())),
//! );
//!
//! let decision = engine.decide("how do I reset my password?", None).await;
//! println!("{}: {}", decision.disposition.is_escalation(), decision.response);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! - [`triage_core`] - shared domain types and errors
//! - [`triage_index`] - TF-IDF term index, snapshots, cosine retriever
//! - [`triage_store`] - SQLite persistence for chunks, tickets, metrics
//! - [`triage_llm`] - compression and generation collaborators
//! - [`triage_engine`] - the decision engine and KB rebuild pipeline

pub use triage_core as core;
pub use triage_engine as engine;
pub use triage_index as index;
pub use triage_llm as llm;
pub use triage_store as store;

/// Prelude module for convenient imports.
///
/// ```rust
/// use triage::prelude::*;
/// ```
pub mod prelude {
    pub use triage_core::error::{ConfigError, IndexError, Result, TriageError};
    pub use triage_core::types::{
        Category, ChatMetric, Chunk, ChunkId, Decision, Disposition, MetricDraft, MetricId,
        Priority, RetrievedChunk, SourceRef, Ticket, TicketDraft, TicketId, TicketNote,
        TicketStatus,
    };

    pub use triage_index::{ChunkSource, IndexSnapshot, Retriever};

    pub use triage_store::{MetricAggregate, TicketFilter, TicketStats, TriageStore};

    pub use triage_llm::{
        Compressor, Condensed, Generation, GenerationBackend, GenerationOutcome,
    };

    pub use triage_engine::{
        detect_red_flag, infer_category, load_documents, BuildReport, DecisionEngine,
        DocumentInput, KbPipeline, CONFIDENCE_THRESHOLD, COVERAGE_THRESHOLD, TOP_K,
    };
}

/// Crate version, from the workspace manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
