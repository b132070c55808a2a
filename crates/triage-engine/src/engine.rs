//! The layered decision engine.

use crate::red_flags::detect_red_flag;
use std::sync::Arc;
use triage_core::types::{
    Category, Decision, Disposition, MetricDraft, MetricId, Priority, RetrievedChunk, SourceRef,
    TicketDraft, TicketId,
};
use triage_index::Retriever;
use triage_llm::{Compressor, GenerationBackend, GenerationOutcome};
use triage_store::TriageStore;

/// Minimum mean retrieval score for the generation path.
pub const CONFIDENCE_THRESHOLD: f64 = 0.20;
/// Minimum total condensed characters across retrieved chunks.
pub const COVERAGE_THRESHOLD: usize = 400;
/// Chunks retrieved per query.
pub const TOP_K: usize = 3;

const SECURITY_RESPONSE: &str = "SECURITY ALERT DETECTED\n\n\
Your query indicates a potential security incident. This requires immediate \
attention from our security team.\n\n\
Immediate actions:\n\
1. Do NOT click any suspicious links\n\
2. Do NOT provide passwords or sensitive information\n\
3. Disconnect from the network if you suspect compromise\n\
4. Contact IT Security immediately: ext. 9999\n\n\
A high-priority security ticket has been created for you.";

/// Runs queries through the security, confidence, and generation gates.
///
/// Construct with [`DecisionEngine::new`]; pass `None` for the generator to
/// run in escalate-only mode, where every query that clears the earlier
/// gates still escalates rather than answering unguarded.
pub struct DecisionEngine {
    retriever: Arc<Retriever>,
    store: TriageStore,
    compressor: Box<dyn Compressor>,
    generator: Option<Box<dyn GenerationBackend>>,
}

impl DecisionEngine {
    pub fn new(
        retriever: Arc<Retriever>,
        store: TriageStore,
        compressor: Box<dyn Compressor>,
        generator: Option<Box<dyn GenerationBackend>>,
    ) -> Self {
        if generator.is_none() {
            tracing::warn!("no generation backend configured, running escalate-only");
        }
        Self {
            retriever,
            store,
            compressor,
            generator,
        }
    }

    /// Decide one query: answer from the knowledge base or escalate.
    ///
    /// Never returns an error. Bookkeeping failures (ticket or metric
    /// writes) are logged and reflected as `None` ids on the decision; the
    /// user-facing outcome does not depend on them.
    pub async fn decide(&self, query: &str, category: Option<Category>) -> Decision {
        if detect_red_flag(query) {
            return self.escalate_security(query);
        }

        let hits = self.retriever.retrieve(query, TOP_K, category);
        let confidence = mean_score(&hits);
        let coverage = total_condensed_chars(&hits);

        if hits.is_empty() || confidence < CONFIDENCE_THRESHOLD || coverage < COVERAGE_THRESHOLD {
            return self.escalate_low_confidence(query, category, &hits, confidence, coverage);
        }

        self.generate_or_escalate(query, category, &hits, confidence, coverage)
            .await
    }

    fn escalate_security(&self, query: &str) -> Decision {
        tracing::warn!("security red flag detected, escalating before retrieval");

        let metric_id = self.record_metric(MetricDraft {
            query: query.to_string(),
            category: Some(Category::Security),
            was_resolved: Some(false),
            ..Default::default()
        });

        let summary = format!("SECURITY: {}", clip(query, 100));
        let description = format!(
            "SECURITY INCIDENT REPORTED\n\nUser query: {query}\n\n\
             Detected by the red-flag screen. Immediate action required."
        );
        let mut draft = TicketDraft::new(summary, description)
            .with_category(Category::Security)
            .with_priority(Priority::Critical)
            .with_tags("security,urgent,red-flag");
        if let Some(metric) = metric_id {
            draft = draft.from_metric(metric);
        }
        let ticket_id = self.file_ticket(&draft, metric_id);

        Decision {
            disposition: Disposition::Security,
            response: SECURITY_RESPONSE.to_string(),
            confidence: 0.0,
            coverage: 0,
            sources: Vec::new(),
            ticket_id,
            metric_id,
        }
    }

    fn escalate_low_confidence(
        &self,
        query: &str,
        category: Option<Category>,
        hits: &[RetrievedChunk],
        confidence: f64,
        coverage: usize,
    ) -> Decision {
        tracing::info!(
            confidence,
            coverage,
            retrieved = hits.len(),
            "below retrieval thresholds, escalating"
        );

        let metric_id = self.record_metric(MetricDraft {
            query: query.to_string(),
            category,
            retrieved_chunks: hits.len() as u32,
            was_resolved: Some(false),
            ..Default::default()
        });

        let mut description = format!(
            "User query: {query}\n\nRetrieval analysis:\n\
             - Confidence score: {:.2}% (threshold: 20%)\n\
             - KB content found: {coverage} characters (threshold: 400)\n\
             - Retrieved chunks: {}\n",
            confidence * 100.0,
            hits.len()
        );
        if !hits.is_empty() {
            description.push_str("\nRetrieved KB sources:\n");
            for (i, hit) in hits.iter().enumerate() {
                description.push_str(&format!(
                    "{}. {} (Category: {})\n",
                    i + 1,
                    hit.chunk.title,
                    hit.chunk.category
                ));
            }
        }
        let mut draft = TicketDraft::new(clip(query, 100), description)
            .with_category(category.unwrap_or(Category::General))
            .with_tags("low-confidence,escalated");
        if let Some(metric) = metric_id {
            draft = draft.from_metric(metric);
        }
        let ticket_id = self.file_ticket(&draft, metric_id);

        let response = format!(
            "I don't have enough verified information in our internal knowledge \
             base to answer this question safely.\n\n\
             Retrieval confidence: {:.2}% (minimum required: 20%)\n\
             KB content found: {coverage} characters (minimum required: 400)\n\n\
             A support ticket has been created so a specialist can help you directly.",
            confidence * 100.0
        );

        Decision {
            disposition: Disposition::LowConfidence,
            response,
            confidence,
            coverage,
            sources: hits.iter().map(SourceRef::from).collect(),
            ticket_id,
            metric_id,
        }
    }

    async fn generate_or_escalate(
        &self,
        query: &str,
        category: Option<Category>,
        hits: &[RetrievedChunk],
        confidence: f64,
        coverage: usize,
    ) -> Decision {
        let context = hits
            .iter()
            .map(|hit| {
                format!(
                    "**{}** (Category: {})\n{}",
                    hit.chunk.title, hit.chunk.category, hit.chunk.condensed_text
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        // Query-time compression of the assembled context. A failure here
        // escalates rather than sending ungoverned context downstream.
        let condensed = match self.compressor.compress(&context).await {
            Ok(condensed) => condensed,
            Err(e) => {
                tracing::warn!(error = %e, "context compression failed, escalating");
                return self.escalate_generation(query, category, hits, confidence, coverage, 0, 0, 0.0, 0.0);
            }
        };

        let generator = match &self.generator {
            Some(generator) => generator,
            None => {
                return self.escalate_generation(
                    query,
                    category,
                    hits,
                    confidence,
                    coverage,
                    condensed.original_tokens,
                    condensed.condensed_tokens,
                    condensed.latency_ms,
                    0.0,
                );
            }
        };

        match generator.generate(query, &condensed.text).await {
            Ok(generation) => match generation.outcome {
                GenerationOutcome::Answer(answer) => {
                    let metric_id = self.record_metric(MetricDraft {
                        query: query.to_string(),
                        category,
                        retrieved_chunks: hits.len() as u32,
                        original_tokens: condensed.original_tokens,
                        condensed_tokens: condensed.condensed_tokens,
                        compression_latency_ms: condensed.latency_ms,
                        generation_latency_ms: generation.latency_ms,
                        ..Default::default()
                    });
                    Decision {
                        disposition: Disposition::Resolved,
                        response: answer,
                        confidence,
                        coverage,
                        sources: hits.iter().map(SourceRef::from).collect(),
                        ticket_id: None,
                        metric_id,
                    }
                }
                GenerationOutcome::Insufficient => {
                    tracing::info!("generator declined, escalating");
                    self.escalate_generation(
                        query,
                        category,
                        hits,
                        confidence,
                        coverage,
                        condensed.original_tokens,
                        condensed.condensed_tokens,
                        condensed.latency_ms,
                        generation.latency_ms,
                    )
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "generation failed, escalating");
                self.escalate_generation(
                    query,
                    category,
                    hits,
                    confidence,
                    coverage,
                    condensed.original_tokens,
                    condensed.condensed_tokens,
                    condensed.latency_ms,
                    0.0,
                )
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn escalate_generation(
        &self,
        query: &str,
        category: Option<Category>,
        hits: &[RetrievedChunk],
        confidence: f64,
        coverage: usize,
        original_tokens: u32,
        condensed_tokens: u32,
        compression_latency_ms: f64,
        generation_latency_ms: f64,
    ) -> Decision {
        let metric_id = self.record_metric(MetricDraft {
            query: query.to_string(),
            category,
            retrieved_chunks: hits.len() as u32,
            original_tokens,
            condensed_tokens,
            compression_latency_ms,
            generation_latency_ms,
            was_resolved: Some(false),
            ..Default::default()
        });

        let mut description = format!(
            "User query: {query}\n\nRetrieval looked adequate but no grounded \
             answer could be produced from the knowledge base.\n"
        );
        description.push_str("\nRetrieved KB sources:\n");
        for (i, hit) in hits.iter().enumerate() {
            description.push_str(&format!(
                "{}. {} (Category: {})\n",
                i + 1,
                hit.chunk.title,
                hit.chunk.category
            ));
        }
        let mut draft = TicketDraft::new(clip(query, 100), description)
            .with_category(category.unwrap_or(Category::General))
            .with_tags("generation-insufficient,escalated");
        if let Some(metric) = metric_id {
            draft = draft.from_metric(metric);
        }
        let ticket_id = self.file_ticket(&draft, metric_id);

        Decision {
            disposition: Disposition::GenerationInsufficient,
            response: "I don't have enough verified information in our internal \
                       knowledge base to answer this question safely. A support \
                       ticket has been created for personalized assistance."
                .to_string(),
            confidence,
            coverage,
            sources: hits.iter().map(SourceRef::from).collect(),
            ticket_id,
            metric_id,
        }
    }

    fn record_metric(&self, draft: MetricDraft) -> Option<MetricId> {
        match self.store.record_metric(&draft) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "metric write failed");
                None
            }
        }
    }

    fn file_ticket(&self, draft: &TicketDraft, metric: Option<MetricId>) -> Option<TicketId> {
        match self.store.create_ticket(draft) {
            Ok(ticket) => {
                if let Some(metric) = metric {
                    if let Err(e) = self.store.link_metric_ticket(metric, ticket) {
                        tracing::warn!(error = %e, "metric-ticket link failed");
                    }
                }
                Some(ticket)
            }
            Err(e) => {
                tracing::warn!(error = %e, "ticket write failed");
                None
            }
        }
    }
}

fn mean_score(hits: &[RetrievedChunk]) -> f64 {
    if hits.is_empty() {
        return 0.0;
    }
    hits.iter().map(|h| h.score).sum::<f64>() / hits.len() as f64
}

fn total_condensed_chars(hits: &[RetrievedChunk]) -> usize {
    hits.iter().map(|h| h.chunk.condensed_text.chars().count()).sum()
}

/// First `max` characters of `s`, on a char boundary.
fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::types::Chunk;

    fn hit(score: f64, condensed: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk: Chunk {
                id: 1,
                source: "s".into(),
                title: "t".into(),
                category: Category::General,
                original_text: String::new(),
                condensed_text: condensed.to_string(),
                original_tokens: 0,
                condensed_tokens: 0,
                compression_latency_ms: 0.0,
            },
            score,
        }
    }

    #[test]
    fn mean_and_coverage_handle_empty() {
        assert_eq!(mean_score(&[]), 0.0);
        assert_eq!(total_condensed_chars(&[]), 0);
    }

    #[test]
    fn mean_and_coverage_aggregate() {
        let hits = vec![hit(0.4, "abcd"), hit(0.2, "ef")];
        assert!((mean_score(&hits) - 0.3).abs() < 1e-12);
        assert_eq!(total_condensed_chars(&hits), 6);
    }

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip("héllo wörld", 4), "héll");
        assert_eq!(clip("ab", 100), "ab");
    }
}
