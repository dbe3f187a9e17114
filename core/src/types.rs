//! Shared primitive types used across the pipeline.

/// Zero-based row offset of a claim in the source scan order.
pub type ClaimId = u64;

/// Provider-side storm identifier (IBTrACS `SID`).
pub type StormId = String;

/// `"{storm_name}_{season}"`, unique within a catalog.
pub type EventName = String;

/// The canonical run identifier.
pub type RunId = String;

/// Fresh run identifier for a pipeline execution.
pub fn new_run_id() -> RunId {
    format!("run-{}", uuid::Uuid::new_v4())
}
