//! Knowledge-base chunk storage.

use crate::store::TriageStore;
use rusqlite::{params, Result as SqlResult, Row};
use triage_core::types::{Category, Chunk};

fn chunk_from_row(row: &Row<'_>) -> SqlResult<Chunk> {
    Ok(Chunk {
        id: row.get(0)?,
        source: row.get(1)?,
        title: row.get(2)?,
        category: row.get::<_, String>(3)?.parse().unwrap_or(Category::Other),
        original_text: row.get(4)?,
        condensed_text: row.get(5)?,
        original_tokens: row.get(6)?,
        condensed_tokens: row.get(7)?,
        compression_latency_ms: row.get(8)?,
    })
}

const CHUNK_COLUMNS: &str = "id, source, title, category, original_text, condensed_text, \
     original_tokens, condensed_tokens, compression_latency_ms";

impl TriageStore {
    /// Insert a chunk and return its assigned id.
    pub fn insert_chunk(&self, chunk: &Chunk) -> SqlResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO kb_chunks (source, title, category, original_text, condensed_text, \
             original_tokens, condensed_tokens, compression_latency_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                chunk.source,
                chunk.title,
                chunk.category.as_str(),
                chunk.original_text,
                chunk.condensed_text,
                chunk.original_tokens,
                chunk.condensed_tokens,
                chunk.compression_latency_ms,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All chunks in insertion order. This order is what the index builder
    /// sees, so it must be stable across calls.
    pub fn list_chunks(&self) -> SqlResult<Vec<Chunk>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("SELECT {CHUNK_COLUMNS} FROM kb_chunks ORDER BY id"))?;
        let rows = stmt.query_map([], chunk_from_row)?;
        rows.collect()
    }

    pub fn list_chunks_by_category(&self, category: Category) -> SqlResult<Vec<Chunk>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CHUNK_COLUMNS} FROM kb_chunks WHERE category = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![category.as_str()], chunk_from_row)?;
        rows.collect()
    }

    /// Drop every chunk; the rebuild pipeline replaces the table wholesale.
    pub fn clear_chunks(&self) -> SqlResult<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM kb_chunks", [])
    }

    pub fn chunk_count(&self) -> SqlResult<usize> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM kb_chunks", [], |row| row.get(0))
    }

    /// Token totals across the knowledge base: (chunks, original tokens,
    /// condensed tokens).
    pub fn kb_stats(&self) -> SqlResult<(usize, u64, u64)> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(original_tokens), 0), COALESCE(SUM(condensed_tokens), 0) \
             FROM kb_chunks",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, category: Category) -> Chunk {
        Chunk {
            id: 0,
            source: format!("{title}.md"),
            title: title.to_string(),
            category,
            original_text: "original body text".to_string(),
            condensed_text: "condensed".to_string(),
            original_tokens: 3,
            condensed_tokens: 1,
            compression_latency_ms: 12.5,
        }
    }

    #[test]
    fn insert_and_list_round_trip() {
        let store = TriageStore::open_in_memory().unwrap();
        let id = store.insert_chunk(&sample("Vpn", Category::Network)).unwrap();
        store.insert_chunk(&sample("Mfa", Category::Authentication)).unwrap();

        let chunks = store.list_chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id, id);
        assert_eq!(chunks[0].title, "Vpn");
        assert_eq!(chunks[0].category, Category::Network);
        assert_eq!(chunks[0].compression_latency_ms, 12.5);
    }

    #[test]
    fn category_filter_and_clear() {
        let store = TriageStore::open_in_memory().unwrap();
        store.insert_chunk(&sample("Vpn", Category::Network)).unwrap();
        store.insert_chunk(&sample("Mfa", Category::Authentication)).unwrap();

        let auth = store.list_chunks_by_category(Category::Authentication).unwrap();
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0].title, "Mfa");

        assert_eq!(store.clear_chunks().unwrap(), 2);
        assert_eq!(store.chunk_count().unwrap(), 0);
    }

    #[test]
    fn kb_stats_sums_tokens() {
        let store = TriageStore::open_in_memory().unwrap();
        store.insert_chunk(&sample("A", Category::General)).unwrap();
        store.insert_chunk(&sample("B", Category::General)).unwrap();
        let (count, orig, cond) = store.kb_stats().unwrap();
        assert_eq!((count, orig, cond), (2, 6, 2));
    }
}
