//! The fitted term index — vocabulary, IDF table, and sparse TF-IDF rows.
//!
//! Fitting is deterministic: identical input chunks produce a bit-identical
//! vocabulary and weight matrix. The fitted vocabulary/IDF pair and the row
//! matrix are one inseparable unit; they are only ever persisted and loaded
//! together (see `IndexSnapshot`).

use crate::tokenize::terms;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use triage_core::error::IndexError;

/// Vocabulary size cap. When the corpus produces more distinct terms, the
/// most frequent across the corpus are kept (ties broken lexicographically).
pub const MAX_VOCABULARY: usize = 1000;

/// Sparse vector as (column, weight) pairs sorted by column.
pub type SparseVec = Vec<(u32, f64)>;

/// Fitted vocabulary/IDF table plus the per-chunk weight matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermIndex {
    /// Term → column. BTreeMap keeps column assignment and serialization
    /// order deterministic.
    vocabulary: BTreeMap<String, u32>,
    /// Smoothed inverse document frequency per column.
    idf: Vec<f64>,
    /// One L2-normalized TF-IDF row per chunk, in chunk order.
    rows: Vec<SparseVec>,
}

impl TermIndex {
    /// An index over zero chunks: empty vocabulary, empty matrix. Every
    /// query transforms to the zero vector.
    pub fn empty() -> Self {
        TermIndex {
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Fit a term index over the given texts (one per chunk, in chunk
    /// order). Rejects empty input with a distinct `NoChunks` error rather
    /// than producing a degenerate index.
    pub fn fit(texts: &[String]) -> Result<TermIndex, IndexError> {
        if texts.is_empty() {
            return Err(IndexError::NoChunks);
        }

        // Per-document term counts, plus corpus-wide counts and document
        // frequencies.
        let mut doc_counts: Vec<BTreeMap<String, u32>> = Vec::with_capacity(texts.len());
        let mut corpus_count: BTreeMap<String, u64> = BTreeMap::new();
        let mut doc_freq: BTreeMap<String, u32> = BTreeMap::new();

        for text in texts {
            let mut counts: BTreeMap<String, u32> = BTreeMap::new();
            for term in terms(text) {
                *counts.entry(term).or_insert(0) += 1;
            }
            for (term, count) in &counts {
                *corpus_count.entry(term.clone()).or_insert(0) += u64::from(*count);
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            doc_counts.push(counts);
        }

        // Cap the vocabulary at the most frequent terms across the corpus.
        let selected: Vec<String> = if corpus_count.len() > MAX_VOCABULARY {
            let mut ranked: Vec<(&String, &u64)> = corpus_count.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let mut kept: Vec<String> =
                ranked.iter().take(MAX_VOCABULARY).map(|(t, _)| (*t).clone()).collect();
            kept.sort();
            kept
        } else {
            corpus_count.keys().cloned().collect()
        };

        let vocabulary: BTreeMap<String, u32> = selected
            .into_iter()
            .enumerate()
            .map(|(col, term)| (term, col as u32))
            .collect();

        let n_docs = texts.len() as f64;
        let mut idf = vec![0.0; vocabulary.len()];
        for (term, col) in &vocabulary {
            let df = f64::from(doc_freq[term]);
            idf[*col as usize] = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
        }

        let rows = doc_counts
            .iter()
            .map(|counts| {
                let mut row: SparseVec = counts
                    .iter()
                    .filter_map(|(term, count)| {
                        vocabulary
                            .get(term)
                            .map(|col| (*col, f64::from(*count) * idf[*col as usize]))
                    })
                    .collect();
                normalize_l2(&mut row);
                row
            })
            .collect();

        Ok(TermIndex {
            vocabulary,
            idf,
            rows,
        })
    }

    /// Vectorize a query strictly against the fitted vocabulary. Terms
    /// outside the vocabulary contribute zero weight; never re-fits.
    pub fn transform(&self, text: &str) -> SparseVec {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for term in terms(text) {
            if let Some(col) = self.vocabulary.get(&term) {
                *counts.entry(*col).or_insert(0) += 1;
            }
        }
        let mut vec: SparseVec = counts
            .into_iter()
            .map(|(col, count)| (col, f64::from(count) * self.idf[col as usize]))
            .collect();
        normalize_l2(&mut vec);
        vec
    }

    /// Weight row for the chunk at `position`.
    pub fn row(&self, position: usize) -> Option<&SparseVec> {
        self.rows.get(position)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Dimension consistency check: idf table matches the vocabulary, and
    /// every stored column fits inside it.
    pub fn check_dimensions(&self) -> Result<(), IndexError> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(IndexError::Integrity(format!(
                "idf table has {} entries for {} vocabulary terms",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        let cols = self.vocabulary.len() as u32;
        for (i, row) in self.rows.iter().enumerate() {
            if row.iter().any(|(col, _)| *col >= cols) {
                return Err(IndexError::Integrity(format!(
                    "row {} references a column outside the vocabulary",
                    i
                )));
            }
        }
        Ok(())
    }
}

/// L2-normalize a sparse vector in place.
fn normalize_l2(vec: &mut SparseVec) {
    let norm: f64 = vec.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in vec.iter_mut() {
            *w /= norm;
        }
    }
}

/// Cosine similarity between two sparse vectors. Both sides are
/// L2-normalized at construction, so this is a merge-join dot product,
/// clamped into [0, 1].
pub fn cosine(a: &SparseVec, b: &SparseVec) -> f64 {
    let mut dot = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fit_rejects_empty_input() {
        assert!(matches!(TermIndex::fit(&[]), Err(IndexError::NoChunks)));
    }

    #[test]
    fn fit_produces_one_row_per_text() {
        let index = TermIndex::fit(&texts(&[
            "reset your password from the login page",
            "vpn client fails to connect on home networks",
            "printer driver installation steps",
        ]))
        .unwrap();
        assert_eq!(index.row_count(), 3);
        assert!(index.vocabulary_len() > 0);
        index.check_dimensions().unwrap();
    }

    #[test]
    fn rows_are_unit_length() {
        let index = TermIndex::fit(&texts(&["password reset steps", "vpn connection help"]))
            .unwrap();
        for pos in 0..index.row_count() {
            let norm: f64 = index.row(pos).unwrap().iter().map(|(_, w)| w * w).sum();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn matching_text_scores_highest_against_itself() {
        let index = TermIndex::fit(&texts(&[
            "reset your password from the login page",
            "vpn client fails to connect",
        ]))
        .unwrap();
        let q = index.transform("how do I reset my password");
        let s0 = cosine(&q, index.row(0).unwrap());
        let s1 = cosine(&q, index.row(1).unwrap());
        assert!(s0 > s1);
        assert!(s0 > 0.0);
        assert!((0.0..=1.0).contains(&s0));
    }

    #[test]
    fn out_of_vocabulary_query_is_zero() {
        let index = TermIndex::fit(&texts(&["password reset steps"])).unwrap();
        let q = index.transform("quantum entanglement");
        assert!(q.is_empty());
        assert_eq!(cosine(&q, index.row(0).unwrap()), 0.0);
    }

    #[test]
    fn fit_is_deterministic() {
        let input = texts(&[
            "reset your password from the login page",
            "vpn client fails to connect on home networks",
        ]);
        let a = TermIndex::fit(&input).unwrap();
        let b = TermIndex::fit(&input).unwrap();
        assert_eq!(a, b);
        // Bit-identical through serialization too
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn vocabulary_cap_keeps_most_frequent_terms() {
        // Generate more distinct terms than the cap; the common term must
        // survive selection.
        let mut docs: Vec<String> = (0..60)
            .map(|i| {
                format!(
                    "password filler{}a filler{}b filler{}c filler{}d filler{}e \
                     filler{}f filler{}g filler{}h filler{}i filler{}j",
                    i, i, i, i, i, i, i, i, i, i
                )
            })
            .collect();
        docs.push("password help".to_string());
        let index = TermIndex::fit(&docs).unwrap();
        assert_eq!(index.vocabulary_len(), MAX_VOCABULARY);
        assert!(!index.transform("password").is_empty());
    }

    #[test]
    fn dimension_check_catches_bad_columns() {
        let mut index = TermIndex::fit(&texts(&["password reset"])).unwrap();
        index.rows[0].push((9999, 0.5));
        assert!(matches!(
            index.check_dimensions(),
            Err(IndexError::Integrity(_))
        ));
    }
}
