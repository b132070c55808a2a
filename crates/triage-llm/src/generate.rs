//! Grounded answer generation collaborator.

use crate::prompt::{ESCALATE_MARKER, INSUFFICIENT_MARKER};
use crate::service::ServiceResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Interpreted generator output.
///
/// The raw model text is parsed exactly once, here at the service boundary;
/// everything downstream branches on the variant, never on marker strings.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// A grounded answer, passed through verbatim.
    Answer(String),
    /// The generator declined: the supplied snippets were not enough.
    Insufficient,
}

impl GenerationOutcome {
    /// Classify raw generator text. Any output carrying a refusal marker is
    /// a refusal, even if the model wrapped it in prose.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.contains(INSUFFICIENT_MARKER) || trimmed.contains(ESCALATE_MARKER) {
            GenerationOutcome::Insufficient
        } else {
            GenerationOutcome::Answer(trimmed.to_string())
        }
    }
}

/// One generation call's outcome plus its latency.
#[derive(Debug, Clone)]
pub struct Generation {
    pub outcome: GenerationOutcome,
    pub latency_ms: f64,
}

/// Produces grounded answers from a query and condensed snippet context.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, query: &str, context: &str) -> ServiceResult<Generation>;
}

/// Canned-response generator for tests.
///
/// Returns the response whose pattern appears in the query; unmatched
/// queries decline, which is the conservative default for a grounded
/// assistant.
pub struct MockGenerator {
    responses: HashMap<String, String>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
        }
    }

    pub fn with_response(mut self, pattern: &str, response: &str) -> Self {
        self.responses.insert(pattern.to_string(), response.to_string());
        self
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, query: &str, _context: &str) -> ServiceResult<Generation> {
        for (pattern, response) in &self.responses {
            if query.contains(pattern) {
                return Ok(Generation {
                    outcome: GenerationOutcome::parse(response),
                    latency_ms: 0.0,
                });
            }
        }
        Ok(Generation {
            outcome: GenerationOutcome::Insufficient,
            latency_ms: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_pass_through_verbatim() {
        let outcome = GenerationOutcome::parse("  Restart the VPN client.  ");
        assert_eq!(outcome, GenerationOutcome::Answer("Restart the VPN client.".to_string()));
    }

    #[test]
    fn refusal_markers_win_even_inside_prose() {
        assert_eq!(GenerationOutcome::parse("INSUFFICIENT"), GenerationOutcome::Insufficient);
        assert_eq!(
            GenerationOutcome::parse("I must say INSUFFICIENT here."),
            GenerationOutcome::Insufficient
        );
        assert_eq!(GenerationOutcome::parse("ESCALATE"), GenerationOutcome::Insufficient);
    }

    #[tokio::test]
    async fn mock_matches_patterns_and_declines_otherwise() {
        let backend = MockGenerator::new().with_response("vpn", "Reinstall the VPN client.");

        let hit = backend.generate("my vpn is broken", "ctx").await.unwrap();
        assert_eq!(
            hit.outcome,
            GenerationOutcome::Answer("Reinstall the VPN client.".to_string())
        );

        let miss = backend.generate("unrelated question", "ctx").await.unwrap();
        assert_eq!(miss.outcome, GenerationOutcome::Insufficient);
    }
}
