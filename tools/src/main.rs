//! stormlink-runner: batch runner linking insurance claims to named storms.
//!
//! Usage:
//!   stormlink-runner
//!   stormlink-runner --config data/pipeline.json --top 10
//!   stormlink-runner --tracks ibtracs.csv --claims claims.parquet --db run.db --json report.json

use anyhow::{Context, Result};
use std::env;
use stormlink_core::{
    aggregate::{top_storms, top_storms_by_count, PeriodSummary},
    config::PipelineConfig,
    ibtracs::IbtracsSource,
    pipeline::{Pipeline, PipelineReport},
    store::ResultStore,
    types::new_run_id,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match flag_value(&args, "--config") {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(v) = flag_value(&args, "--tracks") {
        config.paths.tracks = v.to_string();
    }
    if let Some(v) = flag_value(&args, "--claims") {
        config.paths.claims = v.to_string();
    }
    if let Some(v) = flag_value(&args, "--catalog") {
        config.paths.catalog = v.to_string();
    }
    if let Some(v) = flag_value(&args, "--db") {
        config.paths.results_db = v.to_string();
    }
    config.report.top_storms = parse_arg(&args, "--top", config.report.top_storms);
    let json_out = flag_value(&args, "--json");

    println!("stormlink-runner");
    println!("  seasons:   {}..={}", config.catalog.start_year, config.catalog.end_year);
    println!("  tracks:    {}", config.paths.tracks);
    println!("  claims:    {}", config.paths.claims);
    println!("  catalog:   {}", config.paths.catalog);
    println!("  db:        {}", config.paths.results_db);
    println!();

    let source = IbtracsSource::open(&config.paths.tracks)
        .with_context(|| format!("loading storm tracks from {}", config.paths.tracks))?;
    let store = ResultStore::open(&config.paths.results_db)?;
    store.migrate()?;

    let top = config.report.top_storms;
    let mut pipeline = Pipeline::new(new_run_id(), config, store);
    let report = pipeline.run(&source)?;

    print_summary(&report, top);

    if let Some(path) = json_out {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("writing report to {path}"))?;
        log::info!("Report written to {path}");
    }
    Ok(())
}

fn print_summary(report: &PipelineReport, top: usize) {
    println!("=== RUN SUMMARY ===");
    println!("  run_id:           {}", report.run_id);
    println!("  storms:           {}", report.storms_in_catalog);
    println!("  skipped seasons:  {:?}", report.skipped_seasons);
    println!("  skipped storms:   {}", report.skipped_storms);
    println!("  reference year:   {}", report.reference_year);
    println!("  claims scanned:   {}", report.claims_scanned);
    println!("  claims dated:     {}", report.claims_dated);
    println!("  claims linked:    {}", report.claims_linked);

    println!();
    println!("=== TOP {top} STORMS BY ADJUSTED LOSS ===");
    if report.by_storm.is_empty() {
        println!("  (No claims linked)");
    }
    for (i, s) in top_storms(&report.by_storm, top).iter().enumerate() {
        println!(
            "  {:>3}. {:<24} | Claims: {:>8} | Loss: ${:.0} | Adjusted: ${:.0}",
            i + 1,
            s.event_name,
            s.num_claims,
            s.total_loss,
            s.adjusted_total_loss
        );
    }

    println!();
    println!("=== TOP {top} STORMS BY CLAIM COUNT ===");
    for (i, s) in top_storms_by_count(&report.by_storm, top).iter().enumerate() {
        println!(
            "  {:>3}. {:<24} | Claims: {:>8} | Adjusted: ${:.0}",
            i + 1,
            s.event_name,
            s.num_claims,
            s.adjusted_total_loss
        );
    }

    println!();
    println!("=== BY YEAR ===");
    print_series(&report.by_year);

    println!();
    println!("=== BY MONTH ===");
    print_series(&report.by_month);
}

fn print_series(rows: &[PeriodSummary]) {
    if rows.is_empty() {
        println!("  (empty)");
    }
    for p in rows {
        println!(
            "  {:<8} | Claims: {:>8} | Adjusted: ${:.0}",
            p.label(),
            p.num_claims,
            p.adjusted_total_loss
        );
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
