//! Loss severity and frequency summaries over linked claims.
//!
//! These tables are what the charts are drawn from: per storm (top-N bars,
//! count-vs-cost scatter) and per year or month (time series).

use crate::{linker::LinkedClaim, types::EventName};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Year,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
        }
    }

    /// First day of the period containing `date`.
    pub fn truncate(&self, date: NaiveDate) -> NaiveDate {
        let (year, month) = match self {
            Self::Year => (date.year(), 1),
            Self::Month => (date.year(), date.month()),
        };
        // Day 1 exists in every month.
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
    }

    pub fn label(&self, period_start: NaiveDate) -> String {
        match self {
            Self::Year => period_start.format("%Y").to_string(),
            Self::Month => period_start.format("%Y-%m").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormSummary {
    pub event_name: EventName,
    pub num_claims: u64,
    pub total_loss: f64,
    pub adjusted_total_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub granularity: Granularity,
    pub period_start: NaiveDate,
    pub num_claims: u64,
    pub total_loss: f64,
    pub adjusted_total_loss: f64,
}

impl PeriodSummary {
    pub fn label(&self) -> String {
        self.granularity.label(self.period_start)
    }
}

#[derive(Default)]
struct Totals {
    count: u64,
    total: f64,
    adjusted: f64,
}

impl Totals {
    fn add(&mut self, claim: &LinkedClaim) {
        self.count += 1;
        self.total += claim.total_loss;
        self.adjusted += claim.adjusted_total_loss;
    }
}

/// One row per storm, largest adjusted loss first. Ties by name.
pub fn summarize_by_storm(linked: &[LinkedClaim]) -> Vec<StormSummary> {
    let mut totals: HashMap<&str, Totals> = HashMap::new();
    for claim in linked {
        totals.entry(claim.event_name.as_str()).or_default().add(claim);
    }

    let mut rows: Vec<StormSummary> = totals
        .into_iter()
        .map(|(name, t)| StormSummary {
            event_name: name.to_string(),
            num_claims: t.count,
            total_loss: t.total,
            adjusted_total_loss: t.adjusted,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.adjusted_total_loss
            .total_cmp(&a.adjusted_total_loss)
            .then_with(|| a.event_name.cmp(&b.event_name))
    });
    rows
}

/// One row per period that has claims, in chronological order.
pub fn summarize_by_period(linked: &[LinkedClaim], granularity: Granularity) -> Vec<PeriodSummary> {
    let mut totals: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for claim in linked {
        let period = granularity.truncate(claim.date_of_loss.date());
        totals.entry(period).or_default().add(claim);
    }

    totals
        .into_iter()
        .map(|(period_start, t)| PeriodSummary {
            granularity,
            period_start,
            num_claims: t.count,
            total_loss: t.total,
            adjusted_total_loss: t.adjusted,
        })
        .collect()
}

/// The `n` storms with the largest adjusted loss.
pub fn top_storms(summaries: &[StormSummary], n: usize) -> &[StormSummary] {
    &summaries[..n.min(summaries.len())]
}

/// The `n` storms with the most linked claims. Ties by adjusted loss.
pub fn top_storms_by_count(summaries: &[StormSummary], n: usize) -> Vec<StormSummary> {
    let mut rows = summaries.to_vec();
    rows.sort_by(|a, b| {
        b.num_claims
            .cmp(&a.num_claims)
            .then_with(|| b.adjusted_total_loss.total_cmp(&a.adjusted_total_loss))
            .then_with(|| a.event_name.cmp(&b.event_name))
    });
    rows.truncate(n);
    rows
}
