//! The pipeline: one batch run from storm tracks and claims to summaries.
//!
//! STAGE ORDER (fixed, documented, never reordered):
//!   1. Build the storm catalog from the track source
//!   2. Write the catalog file
//!   3. Read the catalog file back (linking always uses the persisted copy)
//!   4. Scan and link claims
//!   5. Aggregate by storm, year and month
//!   6. Persist linked claims and summaries
//!
//! RULES:
//!   - Each stage consumes only the previous stage's output.
//!   - Each completed stage appends one PipelineEvent to the event log.
//!   - Any I/O or store error aborts the run.

use crate::{
    aggregate::{summarize_by_period, summarize_by_storm, Granularity, PeriodSummary, StormSummary},
    catalog_file::{read_catalog, write_catalog},
    claims::ClaimScanner,
    config::PipelineConfig,
    error::LinkResult,
    event::{EventLogEntry, PipelineEvent},
    inflation::InflationAdjuster,
    linker::{LinkOutcome, StormLinker},
    storm::{build_catalog, StormCatalog, TrackSource},
    store::ResultStore,
    types::RunId,
};
use serde::Serialize;

/// What a finished run reports back to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: RunId,
    pub storms_in_catalog: usize,
    pub skipped_seasons: Vec<i32>,
    pub skipped_storms: usize,
    pub reference_year: i32,
    pub claims_scanned: u64,
    pub claims_dated: u64,
    pub claims_linked: usize,
    pub by_storm: Vec<StormSummary>,
    pub by_year: Vec<PeriodSummary>,
    pub by_month: Vec<PeriodSummary>,
}

pub struct Pipeline {
    pub run_id: RunId,
    config: PipelineConfig,
    store: ResultStore,
    seq: u32,
}

impl Pipeline {
    /// The store must already be migrated.
    pub fn new(run_id: RunId, config: PipelineConfig, store: ResultStore) -> Self {
        Self { run_id, config, store, seq: 0 }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn into_store(self) -> ResultStore {
        self.store
    }

    /// Run every stage once, in order.
    pub fn run(&mut self, source: &dyn TrackSource) -> LinkResult<PipelineReport> {
        self.config.validate()?;
        self.store.insert_run(
            &self.run_id,
            env!("CARGO_PKG_VERSION"),
            &serde_json::to_string(&self.config)?,
            chrono::Utc::now().naive_utc(),
        )?;
        self.emit(PipelineEvent::RunInitialized {
            run_id: self.run_id.clone(),
            start_year: self.config.catalog.start_year,
            end_year: self.config.catalog.end_year,
        })?;

        // 1. Build
        let build = build_catalog(source, &self.config.catalog);
        self.emit(PipelineEvent::CatalogBuilt {
            storms: build.catalog.len(),
            skipped_seasons: build.skipped_seasons.clone(),
            skipped_storms: build.skipped_storms,
        })?;

        // 2-3. Persist and reload
        let catalog_path = self.config.paths.catalog.clone();
        write_catalog(&catalog_path, &build.catalog)?;
        self.emit(PipelineEvent::CatalogPersisted { path: catalog_path.clone() })?;
        let catalog = read_catalog(&catalog_path)?;
        self.emit(PipelineEvent::CatalogReloaded {
            storms: catalog.len(),
            reference_year: catalog.reference_year(),
        })?;

        // 4. Link
        let inflation = self.adjuster(&catalog);
        let outcome = self.link(&catalog, inflation)?;
        self.emit(PipelineEvent::ClaimsLinked {
            scanned: outcome.claims_scanned,
            dated: outcome.claims_dated,
            linked: outcome.linked.len(),
        })?;

        // 5. Aggregate
        let by_storm = summarize_by_storm(&outcome.linked);
        let by_year = summarize_by_period(&outcome.linked, Granularity::Year);
        let by_month = summarize_by_period(&outcome.linked, Granularity::Month);
        self.emit(PipelineEvent::SummariesComputed {
            storms: by_storm.len(),
            years: by_year.len(),
            months: by_month.len(),
        })?;

        // 6. Persist results
        self.store.insert_linked_claims(&self.run_id, &outcome.linked)?;
        self.store.insert_storm_summaries(&self.run_id, &by_storm)?;
        self.store.insert_period_summaries(&self.run_id, &by_year)?;
        self.store.insert_period_summaries(&self.run_id, &by_month)?;
        self.emit(PipelineEvent::ResultsPersisted {
            linked: outcome.linked.len(),
            storms: by_storm.len(),
            periods: by_year.len() + by_month.len(),
        })?;

        Ok(PipelineReport {
            run_id: self.run_id.clone(),
            storms_in_catalog: catalog.len(),
            skipped_seasons: build.skipped_seasons,
            skipped_storms: build.skipped_storms,
            reference_year: inflation.reference_year,
            claims_scanned: outcome.claims_scanned,
            claims_dated: outcome.claims_dated,
            claims_linked: outcome.linked.len(),
            by_storm,
            by_year,
            by_month,
        })
    }

    /// An empty catalog has no reference year; fall back to the year after
    /// the configured range. Nothing links in that case anyway.
    fn adjuster(&self, catalog: &StormCatalog) -> InflationAdjuster {
        InflationAdjuster::for_catalog(catalog, &self.config.inflation).unwrap_or_else(|| {
            log::warn!("Storm catalog is empty; no claim can be linked");
            InflationAdjuster::new(self.config.catalog.end_year + 1, self.config.inflation.annual_rate)
        })
    }

    fn link(&self, catalog: &StormCatalog, inflation: InflationAdjuster) -> LinkResult<LinkOutcome> {
        let linker = StormLinker::new(catalog, &self.config.linking, inflation);
        let scanner = ClaimScanner::open(&self.config.paths.claims, self.config.scan.batch_size)?;
        linker.link_scan(scanner)
    }

    fn emit(&mut self, event: PipelineEvent) -> LinkResult<()> {
        log::info!("[{}] {}", event.stage(), event.event_type());
        let entry = EventLogEntry::new(&self.run_id, self.seq, &event)?;
        self.store.append_event(&entry)?;
        self.seq += 1;
        Ok(())
    }
}
