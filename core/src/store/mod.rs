//! SQLite results store.
//!
//! RULE: Only the store talks to the database.
//! The pipeline calls store methods; it never executes SQL directly.

use crate::{error::LinkResult, event::EventLogEntry};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

mod linked_claim;
mod summary;

pub struct ResultStore {
    conn: Connection,
}

/// A row of the `run` table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub run_id: String,
    pub version: String,
    pub config_json: String,
    pub started_at: NaiveDateTime,
}

impl ResultStore {
    /// Open (or create) the results database at `path`.
    pub fn open(path: &str) -> LinkResult<Self> {
        let conn = Connection::open(path)?;
        // WAL is ignored by :memory: databases.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> LinkResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_results.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        version: &str,
        config_json: &str,
        started_at: NaiveDateTime,
    ) -> LinkResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, version, config_json, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, version, config_json, started_at],
        )?;
        Ok(())
    }

    pub fn run(&self, run_id: &str) -> LinkResult<Option<RunRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT run_id, version, config_json, started_at FROM run WHERE run_id = ?1",
                params![run_id],
                |row| {
                    Ok(RunRecord {
                        run_id: row.get(0)?,
                        version: row.get(1)?,
                        config_json: row.get(2)?,
                        started_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> LinkResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, seq, stage, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.seq,
                entry.stage,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_run(&self, run_id: &str) -> LinkResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, seq, stage, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY seq ASC, id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    seq: row.get(2)?,
                    stage: row.get(3)?,
                    event_type: row.get(4)?,
                    payload: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
