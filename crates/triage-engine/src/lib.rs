//! The answer-or-escalate decision engine and the knowledge-base rebuild
//! pipeline.
//!
//! [`DecisionEngine::decide`] runs a query through three layered gates, in
//! order: security red flags, then retrieval confidence and coverage, then
//! the generator's own insufficiency signal. A query answers from the
//! knowledge base only if every gate passes; anything else escalates to a
//! human with a ticket.

mod engine;
mod pipeline;
mod red_flags;

pub use engine::{DecisionEngine, CONFIDENCE_THRESHOLD, COVERAGE_THRESHOLD, TOP_K};
pub use pipeline::{
    infer_category, load_documents, resolved_ticket_documents, BuildReport, DocumentInput,
    KbPipeline,
};
pub use red_flags::detect_red_flag;
