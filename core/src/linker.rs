//! Claim-to-storm linker.
//!
//! Three steps per claim:
//!   1. Candidates: storms indexed under the claim's loss year. By default
//!      a storm is indexed only under the year of its `start_date`.
//!   2. Eligibility: `start_date <= date_of_loss <= end_date` and
//!      `total_loss > 0`.
//!   3. Tie-break: highest `max_wind`, then highest `ace`, then earliest
//!      position in the catalog.
//!
//! Claims without a date or without an eligible storm are dropped. Nothing
//! here fails on a bad row.

use crate::{
    claims::{ClaimRecord, ClaimScanner},
    config::LinkConfig,
    error::LinkResult,
    inflation::InflationAdjuster,
    storm::{StormCatalog, StormEvent},
    types::{ClaimId, EventName},
};
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A claim resolved to exactly one storm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedClaim {
    pub claim_id: ClaimId,
    pub date_of_loss: NaiveDateTime,
    pub state: Option<String>,
    pub event_name: EventName,
    pub ace: f64,
    pub max_wind: f64,
    pub total_loss: f64,
    pub adjusted_total_loss: f64,
}

/// Totals from a full scan.
#[derive(Debug, Clone, Default)]
pub struct LinkOutcome {
    /// Ascending `claim_id`.
    pub linked: Vec<LinkedClaim>,
    pub claims_scanned: u64,
    /// Claims with a usable `date_of_loss`.
    pub claims_dated: u64,
}

pub struct StormLinker<'a> {
    catalog: &'a StormCatalog,
    /// Loss year -> catalog positions, ascending.
    by_year: HashMap<i32, Vec<usize>>,
    inflation: InflationAdjuster,
}

impl<'a> StormLinker<'a> {
    pub fn new(catalog: &'a StormCatalog, config: &LinkConfig, inflation: InflationAdjuster) -> Self {
        let mut by_year: HashMap<i32, Vec<usize>> = HashMap::new();
        for (pos, event) in catalog.events().iter().enumerate() {
            let first = event.start_date.year();
            let last = if config.cross_year_windows {
                event.end_date.year().max(first)
            } else {
                first
            };
            for year in first..=last {
                by_year.entry(year).or_default().push(pos);
            }
        }
        Self { catalog, by_year, inflation }
    }

    pub fn inflation(&self) -> &InflationAdjuster {
        &self.inflation
    }

    /// Best eligible storm for a single claim.
    pub fn link_claim(&self, claim: &ClaimRecord) -> Option<LinkedClaim> {
        let date_of_loss = claim.date_of_loss?;
        let total_loss = claim.total_loss();
        if total_loss.is_nan() || total_loss <= 0.0 {
            return None;
        }

        let candidates = self.by_year.get(&date_of_loss.year())?;
        let best = candidates
            .iter()
            .filter_map(|&pos| self.catalog.get(pos))
            .filter(|storm| storm.covers(date_of_loss))
            .fold(None::<&StormEvent>, |best, storm| match best {
                Some(current) if rank(current, storm) != Ordering::Less => Some(current),
                _ => Some(storm),
            })?;

        Some(LinkedClaim {
            claim_id: claim.claim_id,
            date_of_loss,
            state: claim.state.clone(),
            event_name: best.event_name.clone(),
            ace: best.ace,
            max_wind: best.max_wind,
            total_loss,
            adjusted_total_loss: self.inflation.adjust(total_loss, date_of_loss),
        })
    }

    pub fn link_all<'c>(&self, claims: impl IntoIterator<Item = &'c ClaimRecord>) -> Vec<LinkedClaim> {
        let mut linked: Vec<LinkedClaim> = claims.into_iter().filter_map(|c| self.link_claim(c)).collect();
        linked.sort_by_key(|l| l.claim_id);
        linked
    }

    /// Drain a scanner batch by batch. Read errors propagate.
    pub fn link_scan(&self, scanner: ClaimScanner) -> LinkResult<LinkOutcome> {
        let mut outcome = LinkOutcome::default();
        for batch in scanner {
            let batch = batch?;
            outcome.claims_scanned += batch.len() as u64;
            outcome.claims_dated += batch.iter().filter(|c| c.date_of_loss.is_some()).count() as u64;
            outcome.linked.extend(batch.iter().filter_map(|c| self.link_claim(c)));
        }
        outcome.linked.sort_by_key(|l| l.claim_id);
        log::info!(
            "Linked {} of {} claims ({} dated)",
            outcome.linked.len(),
            outcome.claims_scanned,
            outcome.claims_dated
        );
        Ok(outcome)
    }
}

/// `Greater` when `a` outranks `b`. Equal ranks keep the earlier storm.
fn rank(a: &StormEvent, b: &StormEvent) -> Ordering {
    a.max_wind
        .total_cmp(&b.max_wind)
        .then_with(|| a.ace.total_cmp(&b.ace))
}
