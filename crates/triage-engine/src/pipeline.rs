//! Knowledge-base rebuild pipeline: load documents, condense them, store
//! the chunks, and refresh the retrieval index.

use std::path::Path;
use std::sync::Arc;
use triage_core::error::{Result, TriageError};
use triage_core::types::{Category, Chunk};
use triage_index::Retriever;
use triage_llm::Compressor;
use triage_store::TriageStore;

/// One document headed for the knowledge base.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub source: String,
    pub title: String,
    pub category: Category,
    pub body: String,
}

/// Outcome of one rebuild run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub chunks_indexed: usize,
    /// Per-document failures; these documents were skipped, not fatal.
    pub errors: Vec<String>,
}

/// Map a document filename onto a support category.
pub fn infer_category(filename: &str) -> Category {
    let name = filename.to_lowercase();
    let has = |needle: &str| name.contains(needle);
    if has("vpn") || has("network") || has("remote") {
        Category::Network
    } else if has("password") || has("mfa") || has("auth") {
        Category::Authentication
    } else if has("email") {
        Category::Email
    } else if has("software") || has("installation") {
        Category::Software
    } else if has("printer") || has("hardware") {
        Category::Hardware
    } else if has("file") || has("sharing") {
        Category::FileSharing
    } else if has("performance") {
        Category::Performance
    } else if has("security") {
        Category::Security
    } else {
        Category::General
    }
}

fn title_from_stem(stem: &str) -> String {
    stem.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Load every `.md` and `.txt` document under `dir`, in filename order.
/// A missing directory yields no documents, not an error.
pub fn load_documents(dir: &Path) -> Result<Vec<DocumentInput>> {
    let mut documents = Vec::new();
    if !dir.exists() {
        return Ok(documents);
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("md") | Some("txt")
            )
        })
        .collect();
    paths.sort();

    for path in paths {
        let body = std::fs::read_to_string(&path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        documents.push(DocumentInput {
            source: filename.clone(),
            title: title_from_stem(stem),
            category: infer_category(&filename),
            body,
        });
    }
    Ok(documents)
}

/// Resolved tickets folded back into the knowledge base as documents. The
/// resolution notes become the body; tickets without notes are skipped.
pub fn resolved_ticket_documents(store: &TriageStore) -> Result<Vec<DocumentInput>> {
    let tickets = store
        .resolved_tickets()
        .map_err(|e| TriageError::store(e.to_string()))?;

    let mut documents = Vec::new();
    for ticket in tickets {
        let notes = store
            .ticket_notes(ticket.id)
            .map_err(|e| TriageError::store(e.to_string()))?;
        if notes.is_empty() {
            continue;
        }
        let body = notes
            .iter()
            .map(|n| n.note.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        documents.push(DocumentInput {
            source: "resolved tickets".to_string(),
            title: ticket.summary.clone(),
            category: ticket.category,
            body: format!("{}\n\nResolution:\n{}", ticket.description, body),
        });
    }
    Ok(documents)
}

/// Condenses documents into chunks and refreshes the index.
pub struct KbPipeline {
    store: TriageStore,
    retriever: Arc<Retriever>,
}

impl KbPipeline {
    pub fn new(store: TriageStore, retriever: Arc<Retriever>) -> Self {
        Self { store, retriever }
    }

    /// Replace the knowledge base with `documents`: clear the chunk table,
    /// condense and store each document, then rebuild and swap the index.
    ///
    /// A document whose compression call fails is skipped and reported in
    /// the returned errors; the rebuild carries on with the rest.
    pub async fn rebuild(
        &self,
        documents: &[DocumentInput],
        compressor: &dyn Compressor,
    ) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        self.store
            .clear_chunks()
            .map_err(|e| TriageError::store(e.to_string()))?;

        for doc in documents {
            let condensed = match compressor.compress(&doc.body).await {
                Ok(condensed) => condensed,
                Err(e) => {
                    tracing::warn!(title = %doc.title, error = %e, "compression failed, skipping document");
                    report.errors.push(format!("{}: {}", doc.title, e));
                    continue;
                }
            };

            let chunk = Chunk {
                id: 0,
                source: doc.source.clone(),
                title: doc.title.clone(),
                category: doc.category,
                original_text: doc.body.clone(),
                condensed_text: condensed.text,
                original_tokens: condensed.original_tokens,
                condensed_tokens: condensed.condensed_tokens,
                compression_latency_ms: condensed.latency_ms,
            };
            if let Err(e) = self.store.insert_chunk(&chunk) {
                report.errors.push(format!("{}: {}", doc.title, e));
                continue;
            }
            report.chunks_indexed += 1;
        }

        let indexed = self.retriever.rebuild()?;
        tracing::info!(
            chunks = indexed,
            skipped = report.errors.len(),
            "knowledge base rebuilt"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_inference_covers_keywords() {
        assert_eq!(infer_category("vpn_setup.md"), Category::Network);
        assert_eq!(infer_category("password_reset.md"), Category::Authentication);
        assert_eq!(infer_category("email_rules.txt"), Category::Email);
        assert_eq!(infer_category("software_installation.md"), Category::Software);
        assert_eq!(infer_category("printer_jams.md"), Category::Hardware);
        assert_eq!(infer_category("file_sharing.md"), Category::FileSharing);
        assert_eq!(infer_category("performance_tuning.md"), Category::Performance);
        assert_eq!(infer_category("security_basics.md"), Category::Security);
        assert_eq!(infer_category("misc_notes.md"), Category::General);
    }

    #[test]
    fn titles_come_from_stems() {
        assert_eq!(title_from_stem("vpn_setup_guide"), "Vpn Setup Guide");
        assert_eq!(title_from_stem("single"), "Single");
    }

    #[test]
    fn loads_only_md_and_txt_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_email_rules.md"), "rules").unwrap();
        std::fs::write(dir.path().join("a_vpn_setup.txt"), "vpn").unwrap();
        std::fs::write(dir.path().join("ignore.json"), "{}").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "A Vpn Setup");
        assert_eq!(docs[0].category, Category::Network);
        assert_eq!(docs[1].category, Category::Email);
    }

    #[test]
    fn missing_directory_is_empty() {
        let docs = load_documents(Path::new("/nonexistent/docs")).unwrap();
        assert!(docs.is_empty());
    }
}
