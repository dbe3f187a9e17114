//! Pipeline stage events.
//!
//! RULE: Every stage the pipeline completes emits exactly one event, and
//! every event is appended to the run's `event_log`. The log is the
//! after-the-fact record of what a run did.

use crate::types::RunId;
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunInitialized {
        run_id: RunId,
        start_year: i32,
        end_year: i32,
    },

    // ── Catalog ────────────────────────────────────
    CatalogBuilt {
        storms: usize,
        skipped_seasons: Vec<i32>,
        skipped_storms: usize,
    },
    CatalogPersisted {
        path: String,
    },
    CatalogReloaded {
        storms: usize,
        reference_year: Option<i32>,
    },

    // ── Linking ────────────────────────────────────
    ClaimsLinked {
        scanned: u64,
        dated: u64,
        linked: usize,
    },

    // ── Reporting ──────────────────────────────────
    SummariesComputed {
        storms: usize,
        years: usize,
        months: usize,
    },

    // ── Storage ────────────────────────────────────
    ResultsPersisted {
        linked: usize,
        storms: usize,
        periods: usize,
    },
}

impl PipelineEvent {
    /// The serde tag, used as the `event_type` column.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "run_initialized",
            Self::CatalogBuilt { .. } => "catalog_built",
            Self::CatalogPersisted { .. } => "catalog_persisted",
            Self::CatalogReloaded { .. } => "catalog_reloaded",
            Self::ClaimsLinked { .. } => "claims_linked",
            Self::SummariesComputed { .. } => "summaries_computed",
            Self::ResultsPersisted { .. } => "results_persisted",
        }
    }

    /// Pipeline stage that emits this event.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "pipeline",
            Self::CatalogBuilt { .. } => "catalog",
            Self::CatalogPersisted { .. } | Self::CatalogReloaded { .. } => "catalog_file",
            Self::ClaimsLinked { .. } => "linker",
            Self::SummariesComputed { .. } => "aggregate",
            Self::ResultsPersisted { .. } => "store",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    /// Position of the event within its run, from 0.
    pub seq: u32,
    pub stage: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized PipelineEvent
}

impl EventLogEntry {
    pub fn new(run_id: &str, seq: u32, event: &PipelineEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            run_id: run_id.to_string(),
            seq,
            stage: event.stage().to_string(),
            event_type: event.event_type().to_string(),
            payload: serde_json::to_string(event)?,
        })
    }

    pub fn decode(&self) -> serde_json::Result<PipelineEvent> {
        serde_json::from_str(&self.payload)
    }
}
