use super::ResultStore;
use crate::{error::LinkResult, linker::LinkedClaim};
use rusqlite::params;

impl ResultStore {
    // ── Linked claims ─────────────────────────────────────────────

    /// Insert a run's linked claims in one transaction.
    pub fn insert_linked_claims(&mut self, run_id: &str, linked: &[LinkedClaim]) -> LinkResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO linked_claim (
                    run_id, claim_id, date_of_loss, state, event_name,
                    ace, max_wind, total_loss, adjusted_total_loss
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for l in linked {
                stmt.execute(params![
                    run_id,
                    l.claim_id as i64,
                    l.date_of_loss,
                    l.state,
                    l.event_name,
                    l.ace,
                    l.max_wind,
                    l.total_loss,
                    l.adjusted_total_loss,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Linked claims of a run, ascending `claim_id`.
    pub fn linked_claims(&self, run_id: &str) -> LinkResult<Vec<LinkedClaim>> {
        let mut stmt = self.conn.prepare(
            "SELECT claim_id, date_of_loss, state, event_name,
                    ace, max_wind, total_loss, adjusted_total_loss
             FROM linked_claim WHERE run_id = ?1
             ORDER BY claim_id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(LinkedClaim {
                claim_id: row.get::<_, i64>(0)? as u64,
                date_of_loss: row.get(1)?,
                state: row.get(2)?,
                event_name: row.get(3)?,
                ace: row.get(4)?,
                max_wind: row.get(5)?,
                total_loss: row.get(6)?,
                adjusted_total_loss: row.get(7)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn linked_claim_count(&self, run_id: &str, event_name: &str) -> LinkResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM linked_claim WHERE run_id = ?1 AND event_name = ?2",
            params![run_id, event_name],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
