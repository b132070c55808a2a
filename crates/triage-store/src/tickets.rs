//! Ticket queue operations.

use crate::store::TriageStore;
use rusqlite::{params, Result as SqlResult, Row};
use triage_core::types::{
    Category, Priority, Ticket, TicketDraft, TicketId, TicketNote, TicketStatus,
};

/// Optional filters for listing tickets. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

/// Queue counts for the stats surface.
#[derive(Debug, Clone, Default)]
pub struct TicketStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

const TICKET_COLUMNS: &str = "id, requester_name, department, summary, description, category, \
     priority, status, assignee, tags, from_metric, created_at, updated_at, resolved_at";

fn ticket_from_row(row: &Row<'_>) -> SqlResult<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        requester_name: row.get(1)?,
        department: row.get(2)?,
        summary: row.get(3)?,
        description: row.get(4)?,
        category: row.get::<_, String>(5)?.parse().unwrap_or(Category::Other),
        priority: row.get::<_, String>(6)?.parse().unwrap_or(Priority::Medium),
        status: row.get::<_, String>(7)?.parse().unwrap_or(TicketStatus::Open),
        assignee: row.get(8)?,
        tags: row.get(9)?,
        from_metric: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
        resolved_at: row.get(13)?,
    })
}

impl TriageStore {
    /// File a new ticket; status starts at `Open`.
    pub fn create_ticket(&self, draft: &TicketDraft) -> SqlResult<TicketId> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tickets (requester_name, department, summary, description, category, \
             priority, status, assignee, tags, from_metric) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'Open', ?7, ?8, ?9)",
            params![
                draft.requester_name,
                draft.department,
                draft.summary,
                draft.description,
                draft.category.as_str(),
                draft.priority.as_str(),
                draft.assignee,
                draft.tags,
                draft.from_metric,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(ticket = id, category = %draft.category, "ticket filed");
        Ok(id)
    }

    pub fn get_ticket(&self, id: TicketId) -> SqlResult<Ticket> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
            params![id],
            ticket_from_row,
        )
    }

    /// List tickets matching the filter, newest first.
    pub fn list_tickets(&self, filter: &TicketFilter) -> SqlResult<Vec<Ticket>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE 1=1");
        let mut args: Vec<String> = Vec::new();
        if let Some(status) = filter.status {
            args.push(status.as_str().to_string());
            sql.push_str(&format!(" AND status = ?{}", args.len()));
        }
        if let Some(category) = filter.category {
            args.push(category.as_str().to_string());
            sql.push_str(&format!(" AND category = ?{}", args.len()));
        }
        if let Some(priority) = filter.priority {
            args.push(priority.as_str().to_string());
            sql.push_str(&format!(" AND priority = ?{}", args.len()));
        }
        sql.push_str(" ORDER BY id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), ticket_from_row)?;
        rows.collect()
    }

    /// Transition a ticket's status. Entering `Resolved` or `Closed` stamps
    /// `resolved_at`; leaving them clears it.
    pub fn update_ticket_status(&self, id: TicketId, status: TicketStatus) -> SqlResult<()> {
        let conn = self.conn.lock().unwrap();
        let resolved_clause = if status.is_resolved() {
            "resolved_at = datetime('now')"
        } else {
            "resolved_at = NULL"
        };
        let changed = conn.execute(
            &format!(
                "UPDATE tickets SET status = ?1, updated_at = datetime('now'), {resolved_clause} \
                 WHERE id = ?2"
            ),
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(rusqlite::Error::QueryReturnedNoRows);
        }
        Ok(())
    }

    pub fn update_ticket_priority(&self, id: TicketId, priority: Priority) -> SqlResult<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE tickets SET priority = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![priority.as_str(), id],
        )?;
        if changed == 0 {
            return Err(rusqlite::Error::QueryReturnedNoRows);
        }
        Ok(())
    }

    pub fn assign_ticket(&self, id: TicketId, assignee: &str) -> SqlResult<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE tickets SET assignee = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![assignee, id],
        )?;
        if changed == 0 {
            return Err(rusqlite::Error::QueryReturnedNoRows);
        }
        Ok(())
    }

    pub fn add_ticket_note(&self, id: TicketId, note: &str, created_by: &str) -> SqlResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO ticket_notes (ticket_id, note, created_by) VALUES (?1, ?2, ?3)",
            params![id, note, created_by],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn ticket_notes(&self, id: TicketId) -> SqlResult<Vec<TicketNote>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, ticket_id, note, created_by, created_at FROM ticket_notes \
             WHERE ticket_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok(TicketNote {
                id: row.get(0)?,
                ticket_id: row.get(1)?,
                note: row.get(2)?,
                created_by: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    pub fn ticket_stats(&self) -> SqlResult<TicketStats> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM tickets GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
        })?;
        let mut stats = TicketStats::default();
        for row in rows {
            let (status, count) = row?;
            stats.total += count;
            match status.parse() {
                Ok(TicketStatus::Open) => stats.open += count,
                Ok(TicketStatus::InProgress) => stats.in_progress += count,
                Ok(TicketStatus::Resolved) => stats.resolved += count,
                Ok(TicketStatus::Closed) => stats.closed += count,
                Err(_) => {}
            }
        }
        Ok(stats)
    }

    /// Resolved and closed tickets, oldest first, for folding back into the
    /// knowledge base.
    pub fn resolved_tickets(&self) -> SqlResult<Vec<Ticket>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets \
             WHERE status IN ('Resolved', 'Closed') ORDER BY id"
        ))?;
        let rows = stmt.query_map([], ticket_from_row)?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(summary: &str) -> TicketDraft {
        TicketDraft::new(summary, "details")
            .with_category(Category::Network)
            .with_priority(Priority::High)
    }

    #[test]
    fn create_and_get() {
        let store = TriageStore::open_in_memory().unwrap();
        let id = store.create_ticket(&draft("vpn down")).unwrap();
        let ticket = store.get_ticket(id).unwrap();
        assert_eq!(ticket.summary, "vpn down");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.requester_name, "Anonymous");
        assert!(ticket.resolved_at.is_none());
    }

    #[test]
    fn status_transitions_stamp_resolved_at() {
        let store = TriageStore::open_in_memory().unwrap();
        let id = store.create_ticket(&draft("one")).unwrap();

        store.update_ticket_status(id, TicketStatus::Resolved).unwrap();
        assert!(store.get_ticket(id).unwrap().resolved_at.is_some());

        store.update_ticket_status(id, TicketStatus::InProgress).unwrap();
        assert!(store.get_ticket(id).unwrap().resolved_at.is_none());
    }

    #[test]
    fn missing_ticket_is_an_error() {
        let store = TriageStore::open_in_memory().unwrap();
        assert!(store.update_ticket_status(99, TicketStatus::Closed).is_err());
        assert!(store.get_ticket(99).is_err());
    }

    #[test]
    fn filters_combine() {
        let store = TriageStore::open_in_memory().unwrap();
        store.create_ticket(&draft("a")).unwrap();
        let b = store
            .create_ticket(&draft("b").with_priority(Priority::Low))
            .unwrap();
        store.update_ticket_status(b, TicketStatus::Resolved).unwrap();

        let open_high = store
            .list_tickets(&TicketFilter {
                status: Some(TicketStatus::Open),
                priority: Some(Priority::High),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(open_high.len(), 1);
        assert_eq!(open_high[0].summary, "a");

        let all = store.list_tickets(&TicketFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        // Newest first.
        assert_eq!(all[0].summary, "b");
    }

    #[test]
    fn notes_attach_in_order() {
        let store = TriageStore::open_in_memory().unwrap();
        let id = store.create_ticket(&draft("a")).unwrap();
        store.add_ticket_note(id, "first", "agent").unwrap();
        store.add_ticket_note(id, "second", "agent").unwrap();
        let notes = store.ticket_notes(id).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].note, "first");
        assert_eq!(notes[1].note, "second");
    }

    #[test]
    fn stats_count_by_status() {
        let store = TriageStore::open_in_memory().unwrap();
        store.create_ticket(&draft("a")).unwrap();
        let b = store.create_ticket(&draft("b")).unwrap();
        store.update_ticket_status(b, TicketStatus::Resolved).unwrap();

        let stats = store.ticket_stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.open, 1);
        assert_eq!(stats.resolved, 1);

        let resolved = store.resolved_tickets().unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].summary, "b");
    }
}
