//! Per-query chat metrics.

use crate::store::TriageStore;
use rusqlite::{params, Result as SqlResult, Row};
use triage_core::types::{ChatMetric, MetricDraft, MetricId, TicketId};

/// Aggregate view over all recorded metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricAggregate {
    pub queries: usize,
    /// Queries with a recorded solved/not-solved signal.
    pub with_outcome: usize,
    pub resolved: usize,
    pub escalated_to_ticket: usize,
    pub avg_compression_ratio: f64,
    pub avg_generation_latency_ms: f64,
    pub total_original_tokens: u64,
    pub total_condensed_tokens: u64,
}

const METRIC_COLUMNS: &str = "id, query, category, retrieved_chunks, original_tokens, \
     condensed_tokens, compression_ratio, compression_latency_ms, generation_latency_ms, \
     total_latency_ms, was_resolved, ticket_id, created_at";

fn metric_from_row(row: &Row<'_>) -> SqlResult<ChatMetric> {
    let category: Option<String> = row.get(2)?;
    Ok(ChatMetric {
        id: row.get(0)?,
        query: row.get(1)?,
        category: category.and_then(|s| s.parse().ok()),
        retrieved_chunks: row.get(3)?,
        original_tokens: row.get(4)?,
        condensed_tokens: row.get(5)?,
        compression_ratio: row.get(6)?,
        compression_latency_ms: row.get(7)?,
        generation_latency_ms: row.get(8)?,
        total_latency_ms: row.get(9)?,
        was_resolved: row.get(10)?,
        ticket_id: row.get(11)?,
        created_at: row.get(12)?,
    })
}

impl TriageStore {
    /// Record one query's metrics. Compression ratio and total latency are
    /// derived here so every caller computes them the same way.
    pub fn record_metric(&self, draft: &MetricDraft) -> SqlResult<MetricId> {
        let ratio = if draft.original_tokens > 0 {
            f64::from(draft.condensed_tokens) / f64::from(draft.original_tokens)
        } else {
            0.0
        };
        let total = draft.compression_latency_ms + draft.generation_latency_ms;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO chat_metrics (query, category, retrieved_chunks, original_tokens, \
             condensed_tokens, compression_ratio, compression_latency_ms, \
             generation_latency_ms, total_latency_ms, was_resolved, ticket_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                draft.query,
                draft.category.map(|c| c.as_str()),
                draft.retrieved_chunks,
                draft.original_tokens,
                draft.condensed_tokens,
                ratio,
                draft.compression_latency_ms,
                draft.generation_latency_ms,
                total,
                draft.was_resolved,
                draft.ticket_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Record the out-of-band solved/not-solved signal for a past query.
    pub fn mark_metric_resolved(&self, id: MetricId, resolved: bool) -> SqlResult<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE chat_metrics SET was_resolved = ?1 WHERE id = ?2",
            params![resolved, id],
        )?;
        if changed == 0 {
            return Err(rusqlite::Error::QueryReturnedNoRows);
        }
        Ok(())
    }

    /// Link a metric row to the ticket later filed from it.
    pub fn link_metric_ticket(&self, id: MetricId, ticket: TicketId) -> SqlResult<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE chat_metrics SET ticket_id = ?1 WHERE id = ?2",
            params![ticket, id],
        )?;
        if changed == 0 {
            return Err(rusqlite::Error::QueryReturnedNoRows);
        }
        Ok(())
    }

    /// Most recent metrics, newest first.
    pub fn recent_metrics(&self, limit: usize) -> SqlResult<Vec<ChatMetric>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {METRIC_COLUMNS} FROM chat_metrics ORDER BY id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], metric_from_row)?;
        rows.collect()
    }

    pub fn aggregate_metrics(&self) -> SqlResult<MetricAggregate> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*), \
                    COUNT(was_resolved), \
                    COALESCE(SUM(CASE WHEN was_resolved = 1 THEN 1 ELSE 0 END), 0), \
                    COUNT(ticket_id), \
                    COALESCE(AVG(compression_ratio), 0), \
                    COALESCE(AVG(generation_latency_ms), 0), \
                    COALESCE(SUM(original_tokens), 0), \
                    COALESCE(SUM(condensed_tokens), 0) \
             FROM chat_metrics",
            [],
            |row| {
                Ok(MetricAggregate {
                    queries: row.get(0)?,
                    with_outcome: row.get(1)?,
                    resolved: row.get(2)?,
                    escalated_to_ticket: row.get(3)?,
                    avg_compression_ratio: row.get(4)?,
                    avg_generation_latency_ms: row.get(5)?,
                    total_original_tokens: row.get(6)?,
                    total_condensed_tokens: row.get(7)?,
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::types::{Category, TicketDraft};

    fn draft(query: &str) -> MetricDraft {
        MetricDraft {
            query: query.to_string(),
            category: Some(Category::Network),
            retrieved_chunks: 3,
            original_tokens: 400,
            condensed_tokens: 100,
            compression_latency_ms: 20.0,
            generation_latency_ms: 80.0,
            ..Default::default()
        }
    }

    #[test]
    fn derived_fields_computed_on_insert() {
        let store = TriageStore::open_in_memory().unwrap();
        let id = store.record_metric(&draft("vpn")).unwrap();
        let metric = &store.recent_metrics(1).unwrap()[0];
        assert_eq!(metric.id, id);
        assert_eq!(metric.compression_ratio, 0.25);
        assert_eq!(metric.total_latency_ms, 100.0);
        assert!(metric.was_resolved.is_none());
    }

    #[test]
    fn zero_original_tokens_does_not_divide() {
        let store = TriageStore::open_in_memory().unwrap();
        store
            .record_metric(&MetricDraft {
                query: "q".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.recent_metrics(1).unwrap()[0].compression_ratio, 0.0);
    }

    #[test]
    fn resolution_signal_and_ticket_link() {
        let store = TriageStore::open_in_memory().unwrap();
        let metric = store.record_metric(&draft("vpn")).unwrap();
        let ticket = store.create_ticket(&TicketDraft::new("vpn", "details")).unwrap();

        store.mark_metric_resolved(metric, false).unwrap();
        store.link_metric_ticket(metric, ticket).unwrap();

        let stored = &store.recent_metrics(1).unwrap()[0];
        assert_eq!(stored.was_resolved, Some(false));
        assert_eq!(stored.ticket_id, Some(ticket));

        assert!(store.mark_metric_resolved(999, true).is_err());
    }

    #[test]
    fn aggregate_rolls_up() {
        let store = TriageStore::open_in_memory().unwrap();
        let a = store.record_metric(&draft("a")).unwrap();
        store.record_metric(&draft("b")).unwrap();
        store.mark_metric_resolved(a, true).unwrap();

        let agg = store.aggregate_metrics().unwrap();
        assert_eq!(agg.queries, 2);
        assert_eq!(agg.with_outcome, 1);
        assert_eq!(agg.resolved, 1);
        assert_eq!(agg.escalated_to_ticket, 0);
        assert_eq!(agg.avg_compression_ratio, 0.25);
        assert_eq!(agg.total_original_tokens, 800);
    }
}
