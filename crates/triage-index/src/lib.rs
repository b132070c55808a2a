//! # Triage Index
//!
//! TF-IDF term index and cosine retriever for the triage decision core.
//!
//! The index is built wholesale from the knowledge chunks, persisted as one
//! JSON artifact (fitted vocabulary/IDF table + sparse weight matrix + chunk
//! metadata), and loaded once per process. Queries score against a
//! reference-counted snapshot; rebuilds swap the snapshot atomically so an
//! in-flight query never observes a half-built index.
//!
//! ## Quick Start
//!
//! ```rust
//! use triage_index::{IndexSnapshot, Retriever};
//!
//! // Build from chunks, query through a retriever
//! let retriever = Retriever::in_memory(Box::new(triage_index::EmptySource));
//! let hits = retriever.retrieve("reset my password", 3, None);
//! assert!(hits.is_empty()); // empty store is queryable, not an error
//! ```

mod index;
mod retriever;
mod snapshot;
mod tokenize;

pub use index::{cosine, SparseVec, TermIndex, MAX_VOCABULARY};
pub use retriever::{ChunkSource, EmptySource, Retriever};
pub use snapshot::IndexSnapshot;
pub use tokenize::{terms, tokenize};
