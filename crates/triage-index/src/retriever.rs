//! Cosine retriever over a swappable, reference-counted index snapshot.
//!
//! The retriever is either unloaded or holding an `Arc<IndexSnapshot>`.
//! Each query clones the Arc once and scores against that snapshot only, so
//! a concurrent rebuild swapping the handle never tears an in-flight query.
//! "No index buildable" and "index built but empty" both surface as empty
//! result sets; downstream policy treats no results and low confidence
//! identically.

use crate::index::cosine;
use crate::snapshot::IndexSnapshot;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use triage_core::error::{IndexError, Result, TriageError};
use triage_core::types::{Category, Chunk, RetrievedChunk};

/// Where chunks come from when no persisted artifact exists.
pub trait ChunkSource: Send + Sync {
    /// All chunks currently in the backing store, in stable order.
    fn load_chunks(&self) -> Result<Vec<Chunk>>;
}

/// A source with no chunks; useful for tests and cold starts.
pub struct EmptySource;

impl ChunkSource for EmptySource {
    fn load_chunks(&self) -> Result<Vec<Chunk>> {
        Ok(Vec::new())
    }
}

/// Holds the current index snapshot and answers similarity queries.
pub struct Retriever {
    source: Box<dyn ChunkSource>,
    artifact_path: Option<PathBuf>,
    snapshot: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl Retriever {
    /// A retriever that persists its snapshot at `artifact_path`.
    pub fn new(source: Box<dyn ChunkSource>, artifact_path: impl Into<PathBuf>) -> Self {
        Retriever {
            source,
            artifact_path: Some(artifact_path.into()),
            snapshot: RwLock::new(None),
        }
    }

    /// A retriever with no persisted artifact; always builds from the
    /// source.
    pub fn in_memory(source: Box<dyn ChunkSource>) -> Self {
        Retriever {
            source,
            artifact_path: None,
            snapshot: RwLock::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.read().unwrap().is_some()
    }

    /// Load the persisted artifact if present; otherwise synthesize a
    /// snapshot from whatever chunks the backing store holds. An empty
    /// store yields a valid, empty, queryable snapshot.
    ///
    /// A malformed or inconsistent artifact is treated as unavailable and
    /// triggers the rebuild-from-store fallback.
    pub fn load(&self) -> Result<Arc<IndexSnapshot>> {
        if let Some(path) = &self.artifact_path {
            match IndexSnapshot::load(path) {
                Ok(snapshot) => {
                    let snapshot = Arc::new(snapshot);
                    self.install(Arc::clone(&snapshot));
                    tracing::info!(chunks = snapshot.chunks().len(), "index artifact loaded");
                    return Ok(snapshot);
                }
                Err(TriageError::Index(IndexError::ArtifactMissing(_))) => {
                    tracing::debug!("no index artifact, building from store");
                }
                Err(TriageError::Index(IndexError::Integrity(reason))) => {
                    tracing::warn!(%reason, "index artifact inconsistent, rebuilding from store");
                }
                Err(e) => return Err(e),
            }
        }
        self.build_from_source()
    }

    /// Rebuild the snapshot wholesale from the backing store, persist it
    /// (when an artifact path is configured), and swap it in atomically.
    /// Returns the number of chunks indexed.
    pub fn rebuild(&self) -> Result<usize> {
        let snapshot = self.build_from_source()?;
        Ok(snapshot.chunks().len())
    }

    fn build_from_source(&self) -> Result<Arc<IndexSnapshot>> {
        let chunks = self.source.load_chunks()?;
        let snapshot = if chunks.is_empty() {
            IndexSnapshot::empty()
        } else {
            IndexSnapshot::build(chunks)?
        };
        // An empty rebuild still overwrites the artifact: the prior index
        // must not survive a wholesale rebuild that discarded its chunks.
        if let Some(path) = &self.artifact_path {
            snapshot.save(path)?;
        }
        let snapshot = Arc::new(snapshot);
        self.install(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Swap in a new snapshot. Readers holding the old Arc keep it for the
    /// remainder of their query.
    pub fn install(&self, snapshot: Arc<IndexSnapshot>) {
        *self.snapshot.write().unwrap() = Some(snapshot);
    }

    /// Current snapshot, auto-loading if unloaded. Any load failure
    /// degrades to an empty snapshot — never an error on the query path.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        if let Some(snapshot) = self.snapshot.read().unwrap().as_ref() {
            return Arc::clone(snapshot);
        }
        match self.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "index unavailable, serving empty snapshot");
                let empty = Arc::new(IndexSnapshot::empty());
                self.install(Arc::clone(&empty));
                empty
            }
        }
    }

    /// Top-`top_k` chunks for `query`, optionally restricted to one
    /// category. Scores are cosine similarity in [0, 1], descending, ties
    /// broken by original chunk position. Zero chunks or zero category
    /// matches return an empty result, not an error.
    pub fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        category: Option<Category>,
    ) -> Vec<RetrievedChunk> {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<usize> = match category {
            Some(cat) => snapshot
                .chunks()
                .iter()
                .enumerate()
                .filter(|(_, c)| c.category == cat)
                .map(|(i, _)| i)
                .collect(),
            None => (0..snapshot.chunks().len()).collect(),
        };
        if candidates.is_empty() {
            return Vec::new();
        }

        let query_vec = snapshot.index().transform(query);

        let mut scored: Vec<(usize, f64)> = candidates
            .into_iter()
            .map(|pos| {
                let row = snapshot.index().row(pos).unwrap();
                (pos, cosine(&query_vec, row))
            })
            .collect();
        // Stable sort keeps original position order on score ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(pos, score)| RetrievedChunk {
                chunk: snapshot.chunks()[pos].clone(),
                score,
            })
            .collect()
    }

    /// Sorted distinct categories in the current snapshot.
    pub fn list_categories(&self) -> Vec<Category> {
        self.snapshot().categories()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Vec<Chunk>);

    impl ChunkSource for FixedSource {
        fn load_chunks(&self) -> Result<Vec<Chunk>> {
            Ok(self.0.clone())
        }
    }

    fn chunk(id: i64, title: &str, category: Category, text: &str) -> Chunk {
        Chunk {
            id,
            source: format!("{}.md", title),
            title: title.to_string(),
            category,
            original_text: text.to_string(),
            condensed_text: text.to_string(),
            original_tokens: text.split_whitespace().count() as u32,
            condensed_tokens: text.split_whitespace().count() as u32,
            compression_latency_ms: 0.0,
        }
    }

    fn sample_chunks() -> Vec<Chunk> {
        vec![
            chunk(
                1,
                "Password Reset",
                Category::Authentication,
                "reset your password from the login page using the forgot password link",
            ),
            chunk(
                2,
                "Vpn Setup",
                Category::Network,
                "download the vpn client and connect to the corporate network",
            ),
            chunk(
                3,
                "Mfa Enrollment",
                Category::Authentication,
                "enroll a second factor for password and account protection",
            ),
        ]
    }

    #[test]
    fn empty_store_yields_empty_results() {
        let retriever = Retriever::in_memory(Box::new(EmptySource));
        assert!(retriever.retrieve("anything", 3, None).is_empty());
        assert!(retriever.list_categories().is_empty());
    }

    #[test]
    fn retrieve_returns_at_most_top_k_sorted() {
        let retriever = Retriever::in_memory(Box::new(FixedSource(sample_chunks())));
        let hits = retriever.retrieve("reset my password", 2, None);
        assert!(hits.len() <= 2);
        assert!(!hits.is_empty());
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(hits[0].chunk.title, "Password Reset");
    }

    #[test]
    fn category_filter_restricts_candidates() {
        let retriever = Retriever::in_memory(Box::new(FixedSource(sample_chunks())));
        let hits = retriever.retrieve("password", 3, Some(Category::Authentication));
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.chunk.category == Category::Authentication));

        let none = retriever.retrieve("password", 3, Some(Category::Hardware));
        assert!(none.is_empty());
    }

    #[test]
    fn list_categories_is_sorted_distinct() {
        let retriever = Retriever::in_memory(Box::new(FixedSource(sample_chunks())));
        assert_eq!(
            retriever.list_categories(),
            vec![Category::Authentication, Category::Network]
        );
    }

    #[test]
    fn auto_loads_on_first_query() {
        let retriever = Retriever::in_memory(Box::new(FixedSource(sample_chunks())));
        assert!(!retriever.is_loaded());
        let _ = retriever.retrieve("vpn", 3, None);
        assert!(retriever.is_loaded());
    }
}
