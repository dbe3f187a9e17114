//! Inflation adjustment to a common reference year.

use crate::{config::InflationConfig, storm::StormCatalog};
use chrono::{Datelike, NaiveDateTime};

/// Scales a loss from the year it occurred to `reference_year` by
/// compounding `annual_rate` once per year in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InflationAdjuster {
    pub reference_year: i32,
    pub annual_rate: f64,
}

impl InflationAdjuster {
    pub fn new(reference_year: i32, annual_rate: f64) -> Self {
        Self { reference_year, annual_rate }
    }

    /// Reference year is one past the catalog's latest window end.
    /// `None` for an empty catalog.
    pub fn for_catalog(catalog: &StormCatalog, config: &InflationConfig) -> Option<Self> {
        catalog
            .reference_year()
            .map(|year| Self::new(year, config.annual_rate))
    }

    /// `annual_rate ^ (reference_year - loss_year)`. Losses after the
    /// reference year get a factor below 1.
    pub fn factor(&self, loss_year: i32) -> f64 {
        self.annual_rate.powi(self.reference_year - loss_year)
    }

    pub fn adjust(&self, amount: f64, date_of_loss: NaiveDateTime) -> f64 {
        amount * self.factor(date_of_loss.year())
    }
}
