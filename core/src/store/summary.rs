use super::ResultStore;
use crate::{
    aggregate::{Granularity, PeriodSummary, StormSummary},
    error::LinkResult,
};
use rusqlite::params;

impl ResultStore {
    // ── Storm summaries ───────────────────────────────────────────

    /// `rank` is the position in `rows`, from 1.
    pub fn insert_storm_summaries(&mut self, run_id: &str, rows: &[StormSummary]) -> LinkResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO storm_summary (
                    run_id, rank, event_name, num_claims, total_loss, adjusted_total_loss
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (i, s) in rows.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    (i + 1) as i64,
                    s.event_name,
                    s.num_claims as i64,
                    s.total_loss,
                    s.adjusted_total_loss,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Storm summaries of a run in rank order.
    pub fn storm_summaries(&self, run_id: &str) -> LinkResult<Vec<StormSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT event_name, num_claims, total_loss, adjusted_total_loss
             FROM storm_summary WHERE run_id = ?1
             ORDER BY rank ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(StormSummary {
                event_name: row.get(0)?,
                num_claims: row.get::<_, i64>(1)? as u64,
                total_loss: row.get(2)?,
                adjusted_total_loss: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Period summaries ──────────────────────────────────────────

    pub fn insert_period_summaries(&mut self, run_id: &str, rows: &[PeriodSummary]) -> LinkResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO period_summary (
                    run_id, granularity, period_start, num_claims, total_loss, adjusted_total_loss
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for p in rows {
                stmt.execute(params![
                    run_id,
                    p.granularity.as_str(),
                    p.period_start,
                    p.num_claims as i64,
                    p.total_loss,
                    p.adjusted_total_loss,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// One granularity's series for a run, oldest period first.
    pub fn period_summaries(
        &self,
        run_id: &str,
        granularity: Granularity,
    ) -> LinkResult<Vec<PeriodSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT period_start, num_claims, total_loss, adjusted_total_loss
             FROM period_summary WHERE run_id = ?1 AND granularity = ?2
             ORDER BY period_start ASC",
        )?;
        let rows = stmt.query_map(params![run_id, granularity.as_str()], |row| {
            Ok(PeriodSummary {
                granularity,
                period_start: row.get(0)?,
                num_claims: row.get::<_, i64>(1)? as u64,
                total_loss: row.get(2)?,
                adjusted_total_loss: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
