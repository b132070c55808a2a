//! Domain types shared across the triage crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row id of a knowledge chunk in the backing store.
pub type ChunkId = i64;
/// Row id of a ticket.
pub type TicketId = i64;
/// Row id of a chat metric record.
pub type MetricId = i64;

/// Fixed set of support categories.
///
/// Chunks, tickets, and metrics all carry one of these. The set is closed;
/// free-form categories from the original document sources are mapped onto
/// it at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Network,
    Authentication,
    Email,
    Software,
    Hardware,
    #[serde(rename = "File Sharing")]
    FileSharing,
    Performance,
    Security,
    General,
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 10] = [
        Category::Network,
        Category::Authentication,
        Category::Email,
        Category::Software,
        Category::Hardware,
        Category::FileSharing,
        Category::Performance,
        Category::Security,
        Category::General,
        Category::Other,
    ];

    /// The stable string form used in the store and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Network => "Network",
            Category::Authentication => "Authentication",
            Category::Email => "Email",
            Category::Software => "Software",
            Category::Hardware => "Hardware",
            Category::FileSharing => "File Sharing",
            Category::Performance => "Performance",
            Category::Security => "Security",
            Category::General => "General",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// A condensed, titled, categorized unit of knowledge-base content.
///
/// Immutable once indexed. Within an index snapshot a chunk's identity is
/// its position; `id` is the row id in the backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    /// Where the content came from (filename or "resolved tickets").
    pub source: String,
    pub title: String,
    pub category: Category,
    pub original_text: String,
    /// Output of the compression collaborator; this is what gets indexed
    /// and what grounds generation.
    pub condensed_text: String,
    pub original_tokens: u32,
    pub condensed_tokens: u32,
    /// Latency of the build-time compression call, in milliseconds.
    pub compression_latency_ms: f64,
}

impl Chunk {
    /// The text the term index is fitted on.
    pub fn indexed_text(&self) -> String {
        format!("{} {}", self.title, self.condensed_text)
    }
}

/// One retrieval hit: a chunk plus its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    /// Cosine similarity in [0, 1]; higher is better.
    pub score: f64,
}

/// A lightweight reference to a retrieved chunk, carried on decisions and
/// escalation tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub category: Category,
    pub score: f64,
}

impl From<&RetrievedChunk> for SourceRef {
    fn from(r: &RetrievedChunk) -> Self {
        SourceRef {
            title: r.chunk.title.clone(),
            category: r.chunk.category,
            score: r.score,
        }
    }
}

/// Terminal disposition of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// A security red flag matched; escalated before retrieval.
    Security,
    /// Retrieval confidence or coverage below threshold; escalated.
    LowConfidence,
    /// Generation declined or failed; escalated.
    GenerationInsufficient,
    /// Answered from the knowledge base.
    Resolved,
}

impl Disposition {
    pub fn is_escalation(&self) -> bool {
        !matches!(self, Disposition::Resolved)
    }
}

/// The outcome of one query through the decision engine.
#[derive(Debug, Clone)]
pub struct Decision {
    pub disposition: Disposition,
    /// Verbatim generated answer for `Resolved`; a canned escalation
    /// message otherwise.
    pub response: String,
    /// Mean retrieval score across returned chunks (0 if none).
    pub confidence: f64,
    /// Total condensed-text character length across returned chunks.
    pub coverage: usize,
    pub sources: Vec<SourceRef>,
    /// Ticket filed on escalation paths; None if the ticket write failed.
    pub ticket_id: Option<TicketId>,
    /// Metric row for this query; None if the metric write failed.
    pub metric_id: Option<MetricId>,
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("Low") => Ok(Priority::Low),
            s if s.eq_ignore_ascii_case("Medium") => Ok(Priority::Medium),
            s if s.eq_ignore_ascii_case("High") => Ok(Priority::High),
            s if s.eq_ignore_ascii_case("Critical") => Ok(Priority::Critical),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Ticket lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("Open") => Ok(TicketStatus::Open),
            s if s.eq_ignore_ascii_case("In Progress") => Ok(TicketStatus::InProgress),
            s if s.eq_ignore_ascii_case("Resolved") => Ok(TicketStatus::Resolved),
            s if s.eq_ignore_ascii_case("Closed") => Ok(TicketStatus::Closed),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Fields for filing a new ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDraft {
    pub summary: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub requester_name: String,
    pub department: String,
    pub assignee: String,
    /// Comma-separated tags, fixed per escalation path.
    pub tags: String,
    /// Chat metric this ticket was filed from, if any.
    pub from_metric: Option<MetricId>,
}

impl TicketDraft {
    pub fn new(summary: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            description: description.into(),
            category: Category::General,
            priority: Priority::Medium,
            requester_name: "Anonymous".to_string(),
            department: "General".to_string(),
            assignee: "Unassigned".to_string(),
            tags: String::new(),
            from_metric: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_requester(mut self, name: impl Into<String>) -> Self {
        self.requester_name = name.into();
        self
    }

    pub fn from_metric(mut self, metric: MetricId) -> Self {
        self.from_metric = Some(metric);
        self
    }
}

/// A human-tracked support ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub requester_name: String,
    pub department: String,
    pub summary: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: TicketStatus,
    pub assignee: String,
    pub tags: String,
    pub from_metric: Option<MetricId>,
    pub created_at: String,
    pub updated_at: String,
    pub resolved_at: Option<String>,
}

/// An internal note attached to a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketNote {
    pub id: i64,
    pub ticket_id: TicketId,
    pub note: String,
    pub created_by: String,
    pub created_at: String,
}

/// Per-query metric fields, recorded once per terminal path.
#[derive(Debug, Clone, Default)]
pub struct MetricDraft {
    pub query: String,
    pub category: Option<Category>,
    pub retrieved_chunks: u32,
    pub original_tokens: u32,
    pub condensed_tokens: u32,
    pub compression_latency_ms: f64,
    pub generation_latency_ms: f64,
    /// None until the out-of-band solved/not-solved signal arrives.
    pub was_resolved: Option<bool>,
    pub ticket_id: Option<TicketId>,
}

/// A stored per-query metric row.
#[derive(Debug, Clone)]
pub struct ChatMetric {
    pub id: MetricId,
    pub query: String,
    pub category: Option<Category>,
    pub retrieved_chunks: u32,
    pub original_tokens: u32,
    pub condensed_tokens: u32,
    pub compression_ratio: f64,
    pub compression_latency_ms: f64,
    pub generation_latency_ms: f64,
    pub total_latency_ms: f64,
    pub was_resolved: Option<bool>,
    pub ticket_id: Option<TicketId>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("network".parse::<Category>().unwrap(), Category::Network);
        assert_eq!("file sharing".parse::<Category>().unwrap(), Category::FileSharing);
        assert!("Gardening".parse::<Category>().is_err());
    }

    #[test]
    fn ticket_draft_defaults() {
        let draft = TicketDraft::new("Summary", "Description");
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.requester_name, "Anonymous");
        assert_eq!(draft.assignee, "Unassigned");
    }

    #[test]
    fn escalation_dispositions() {
        assert!(Disposition::Security.is_escalation());
        assert!(Disposition::LowConfidence.is_escalation());
        assert!(Disposition::GenerationInsufficient.is_escalation());
        assert!(!Disposition::Resolved.is_escalation());
    }

    #[test]
    fn resolved_statuses() {
        assert!(TicketStatus::Resolved.is_resolved());
        assert!(TicketStatus::Closed.is_resolved());
        assert!(!TicketStatus::Open.is_resolved());
    }
}
