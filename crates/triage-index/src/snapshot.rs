//! Persisted index artifact — fitted index plus chunk metadata, saved and
//! loaded as one unit.
//!
//! The artifact is a single JSON file. Writers publish to a temporary path
//! in the same directory and rename it into place, so readers never observe
//! a partially written index. Loading a malformed or internally
//! inconsistent artifact is an integrity error, which callers treat as
//! "index unavailable" and rebuild from the backing store.

use crate::index::TermIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use triage_core::error::{IndexError, Result, TriageError};
use triage_core::types::{Category, Chunk};

/// A fitted index paired with the chunks it was built from.
///
/// Row `i` of the index is the weight vector of `chunks[i]`; a chunk's
/// identity within a snapshot is its position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    index: TermIndex,
    chunks: Vec<Chunk>,
}

impl IndexSnapshot {
    /// Build a snapshot from chunks. Empty input is rejected with the
    /// distinct `NoChunks` signal.
    pub fn build(chunks: Vec<Chunk>) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(Chunk::indexed_text).collect();
        let index = TermIndex::fit(&texts)?;
        Ok(IndexSnapshot { index, chunks })
    }

    /// A valid, empty, queryable snapshot — what an empty backing store
    /// loads as.
    pub fn empty() -> Self {
        IndexSnapshot {
            index: TermIndex::empty(),
            chunks: Vec::new(),
        }
    }

    pub fn index(&self) -> &TermIndex {
        &self.index
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Distinct categories present in this snapshot, sorted by name.
    pub fn categories(&self) -> Vec<Category> {
        let set: BTreeSet<Category> = self.chunks.iter().map(|c| c.category).collect();
        let mut categories: Vec<Category> = set.into_iter().collect();
        categories.sort_by_key(|c| c.as_str());
        categories
    }

    /// Internal consistency: row count matches chunk count and every column
    /// fits the vocabulary.
    pub fn validate(&self) -> Result<()> {
        if self.index.row_count() != self.chunks.len() {
            return Err(TriageError::integrity(format!(
                "weight matrix has {} rows for {} chunks",
                self.index.row_count(),
                self.chunks.len()
            )));
        }
        self.index.check_dimensions()?;
        Ok(())
    }

    /// Persist the snapshot as one artifact. Writes to a temporary file in
    /// the target directory, then renames it into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(self)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        tracing::info!(path = %path.display(), chunks = self.chunks.len(), "index artifact saved");
        Ok(())
    }

    /// Load a persisted artifact. A missing file is `ArtifactMissing`;
    /// malformed or inconsistent content is an integrity error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TriageError::Index(IndexError::ArtifactMissing(
                path.display().to_string(),
            )));
        }
        let json = fs::read_to_string(path)?;
        let snapshot: IndexSnapshot = serde_json::from_str(&json)
            .map_err(|e| TriageError::integrity(format!("unreadable artifact: {}", e)))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn empty_snapshot_is_queryable() {
        let snap = IndexSnapshot::empty();
        assert!(snap.is_empty());
        assert!(snap.categories().is_empty());
        snap.validate().unwrap();
    }

    #[test]
    fn build_then_validate() {
        let snap = IndexSnapshot::build(vec![
            chunk(1, "Password Reset", Category::Authentication, "reset password steps"),
            chunk(2, "Vpn Setup", Category::Network, "vpn client download connect"),
        ])
        .unwrap();
        snap.validate().unwrap();
        // Name order, not declaration order.
        assert_eq!(
            snap.categories(),
            vec![Category::Authentication, Category::Network]
        );
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb_index.json");

        let snap = IndexSnapshot::build(vec![
            chunk(1, "Password Reset", Category::Authentication, "reset password steps"),
            chunk(2, "Vpn Setup", Category::Network, "vpn client download connect"),
        ])
        .unwrap();
        snap.save(&path).unwrap();

        let loaded = IndexSnapshot::load(&path).unwrap();
        assert_eq!(loaded.chunks().len(), 2);
        assert_eq!(loaded.categories(), snap.categories());
        assert_eq!(
            serde_json::to_string(loaded.index()).unwrap(),
            serde_json::to_string(snap.index()).unwrap()
        );
    }

    #[test]
    fn missing_artifact_is_distinct_from_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb_index.json");

        match IndexSnapshot::load(&path) {
            Err(TriageError::Index(IndexError::ArtifactMissing(_))) => {}
            other => panic!("expected ArtifactMissing, got {:?}", other),
        }

        std::fs::write(&path, "{ not json").unwrap();
        match IndexSnapshot::load(&path) {
            Err(TriageError::Index(IndexError::Integrity(_))) => {}
            other => panic!("expected Integrity, got {:?}", other),
        }
    }

    #[test]
    fn load_rejects_mismatched_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb_index.json");

        let snap = IndexSnapshot::build(vec![chunk(
            1,
            "Password Reset",
            Category::Authentication,
            "reset password steps",
        )])
        .unwrap();

        // Strip the chunk list so row count no longer matches.
        let mut value: serde_json::Value = serde_json::to_value(&snap).unwrap();
        value["chunks"] = serde_json::json!([]);
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        match IndexSnapshot::load(&path) {
            Err(TriageError::Index(IndexError::Integrity(_))) => {}
            other => panic!("expected Integrity, got {:?}", other),
        }
    }
}
