//! Inflation adjustment tests.

mod common;

use common::{alpha_catalog, day};
use stormlink_core::{
    config::InflationConfig,
    inflation::InflationAdjuster,
    storm::StormCatalog,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9 * b.abs().max(1.0)
}

#[test]
fn reference_year_is_one_past_latest_window_end() {
    let adjuster = InflationAdjuster::for_catalog(&alpha_catalog(), &InflationConfig::default())
        .expect("non-empty catalog");
    assert_eq!(adjuster.reference_year, 2026);
    assert_eq!(adjuster.annual_rate, 1.03);
}

#[test]
fn empty_catalog_has_no_reference_year() {
    assert!(InflationAdjuster::for_catalog(&StormCatalog::default(), &InflationConfig::default()).is_none());
}

#[test]
fn factor_compounds_once_per_year() {
    let adjuster = InflationAdjuster::new(2026, 1.03);
    assert_eq!(adjuster.factor(2026), 1.0);
    assert!(close(adjuster.factor(2025), 1.03));
    assert!(close(adjuster.factor(2021), 1.159_274_074_3));
    assert!(close(adjuster.factor(2000), 1.03f64.powi(26)));
}

#[test]
fn losses_after_the_reference_year_are_deflated() {
    let adjuster = InflationAdjuster::new(2020, 1.03);
    assert!(adjuster.factor(2022) < 1.0);
    assert!(close(adjuster.factor(2022), 1.0 / (1.03 * 1.03)));
}

#[test]
fn adjust_uses_the_loss_year_only() {
    let adjuster = InflationAdjuster::new(2026, 1.03);
    let jan = adjuster.adjust(1_000.0, day(2021, 1, 1));
    let dec = adjuster.adjust(1_000.0, day(2021, 12, 31));
    assert_eq!(jan, dec, "no intra-year proration");
    assert!(close(jan, 1_000.0 * 1.03f64.powi(5)));
}

#[test]
fn custom_rate_is_honored() {
    let adjuster = InflationAdjuster::for_catalog(&alpha_catalog(), &InflationConfig { annual_rate: 1.10 })
        .expect("non-empty catalog");
    assert!(close(adjuster.adjust(100.0, day(2024, 6, 1)), 121.0));
}
