//! Connection handling and schema.

use rusqlite::{Connection, Result as SqlResult};
use std::path::Path;
use std::sync::{Arc, Mutex};
use triage_core::error::Result;
use triage_core::types::Chunk;
use triage_index::ChunkSource;

/// Shared handle to the triage database.
///
/// Clones share one connection. SQLite serializes writes anyway, and the
/// workload here is a handful of statements per chat turn.
#[derive(Clone)]
pub struct TriageStore {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl TriageStore {
    /// Open or create a file-backed database.
    pub fn open<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_with_connection(conn)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> SqlResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> SqlResult<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kb_chunks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                title TEXT NOT NULL,
                category TEXT NOT NULL,
                original_text TEXT NOT NULL,
                condensed_text TEXT NOT NULL,
                original_tokens INTEGER NOT NULL,
                condensed_tokens INTEGER NOT NULL,
                compression_latency_ms REAL NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                requester_name TEXT NOT NULL,
                department TEXT NOT NULL,
                summary TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                priority TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Open',
                assignee TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '',
                from_metric INTEGER REFERENCES chat_metrics(id),
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                resolved_at TEXT
            );

            CREATE TABLE IF NOT EXISTS ticket_notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticket_id INTEGER NOT NULL REFERENCES tickets(id),
                note TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS chat_metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                query TEXT NOT NULL,
                category TEXT,
                retrieved_chunks INTEGER NOT NULL DEFAULT 0,
                original_tokens INTEGER NOT NULL DEFAULT 0,
                condensed_tokens INTEGER NOT NULL DEFAULT 0,
                compression_ratio REAL NOT NULL DEFAULT 0,
                compression_latency_ms REAL NOT NULL DEFAULT 0,
                generation_latency_ms REAL NOT NULL DEFAULT 0,
                total_latency_ms REAL NOT NULL DEFAULT 0,
                was_resolved INTEGER,
                ticket_id INTEGER REFERENCES tickets(id),
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_category ON kb_chunks(category);
            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            CREATE INDEX IF NOT EXISTS idx_notes_ticket ON ticket_notes(ticket_id);
            CREATE INDEX IF NOT EXISTS idx_metrics_created ON chat_metrics(created_at);
            "#,
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl ChunkSource for TriageStore {
    fn load_chunks(&self) -> Result<Vec<Chunk>> {
        self.list_chunks()
            .map_err(|e| triage_core::error::TriageError::store(e.to_string()))
    }
}
