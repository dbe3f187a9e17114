use thiserror::Error;

use crate::types::StormId;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{column}' missing from {path}")]
    MissingColumn { column: String, path: String },

    #[error("Track file line {line}: {reason}")]
    TrackParse { line: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type LinkResult<T> = Result<T, LinkError>;

/// Failures reported by a storm-track provider.
///
/// An empty season is not an error: providers return `Ok(vec![])`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    #[error("Season {year} is not covered by the track source")]
    SeasonUnavailable { year: i32 },

    #[error("Storm '{id}' not found")]
    StormNotFound { id: StormId },

    #[error("Storm '{id}' is malformed: {reason}")]
    Malformed { id: StormId, reason: String },
}
