//! Claims dataset scanner.
//!
//! Streams the claims Parquet file one record batch at a time and turns
//! each batch into `ClaimRecord`s. Only the four columns the linker needs
//! are projected, so the rest of the dataset is never decoded.
//!
//! CONTRACT: `claim_id` is the zero-based row offset in scan order.
//! Reordering or filtering the source file changes claim identities.

use crate::{
    error::{LinkError, LinkResult},
    types::ClaimId,
};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, TimeUnit, TimestampMicrosecondType};
use arrow::record_batch::RecordBatch;
use arrow::temporal_conversions::timestamp_us_to_datetime;
use chrono::NaiveDateTime;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use parquet::arrow::ProjectionMask;
use std::fs::File;
use std::path::Path;

pub const COL_DATE_OF_LOSS: &str = "dateOfLoss";
pub const COL_BUILDING_PAID: &str = "amountPaidOnBuildingClaim";
pub const COL_CONTENTS_PAID: &str = "amountPaidOnContentsClaim";
pub const COL_STATE: &str = "state";

const SCAN_COLUMNS: [&str; 4] = [COL_DATE_OF_LOSS, COL_BUILDING_PAID, COL_CONTENTS_PAID, COL_STATE];

/// One row of the claims dataset, as far as linking is concerned.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRecord {
    pub claim_id: ClaimId,
    /// `None` when the source value is null or unparseable.
    pub date_of_loss: Option<NaiveDateTime>,
    pub state: Option<String>,
    pub building_paid: Option<f64>,
    pub contents_paid: Option<f64>,
}

impl ClaimRecord {
    /// Building plus contents, missing amounts counted as zero.
    pub fn total_loss(&self) -> f64 {
        self.building_paid.unwrap_or(0.0) + self.contents_paid.unwrap_or(0.0)
    }
}

pub struct ClaimScanner {
    reader: ParquetRecordBatchReader,
    path: String,
    next_offset: u64,
}

impl ClaimScanner {
    pub fn open(path: impl AsRef<Path>, batch_size: usize) -> LinkResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

        let schema = builder.schema().clone();
        let mut roots = Vec::with_capacity(SCAN_COLUMNS.len());
        for name in SCAN_COLUMNS {
            let idx = schema.index_of(name).map_err(|_| LinkError::MissingColumn {
                column: name.to_string(),
                path: path.display().to_string(),
            })?;
            roots.push(idx);
        }
        let mask = ProjectionMask::roots(builder.parquet_schema(), roots);

        let reader = builder.with_projection(mask).with_batch_size(batch_size).build()?;
        log::info!("Scanning claims from {}", path.display());
        Ok(Self {
            reader,
            path: path.display().to_string(),
            next_offset: 0,
        })
    }

    /// Rows handed out so far.
    pub fn rows_scanned(&self) -> u64 {
        self.next_offset
    }

    fn decode(&mut self, batch: &RecordBatch) -> LinkResult<Vec<ClaimRecord>> {
        let first_id = self.next_offset;
        let claims = decode_batch(batch, first_id, &self.path)?;
        self.next_offset += batch.num_rows() as u64;
        log::debug!("Decoded claims {first_id}..{}", self.next_offset);
        Ok(claims)
    }
}

impl Iterator for ClaimScanner {
    type Item = LinkResult<Vec<ClaimRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.reader.next()?;
        Some(batch.map_err(LinkError::from).and_then(|b| self.decode(&b)))
    }
}

/// Decode one batch whose first row has id `first_id`.
///
/// Dates go through a safe cast: strings that do not parse become null
/// instead of failing the batch.
pub fn decode_batch(batch: &RecordBatch, first_id: ClaimId, path: &str) -> LinkResult<Vec<ClaimRecord>> {
    let column = |name: &str| -> LinkResult<ArrayRef> {
        batch.column_by_name(name).cloned().ok_or_else(|| LinkError::MissingColumn {
            column: name.to_string(),
            path: path.to_string(),
        })
    };

    let dates = cast(&column(COL_DATE_OF_LOSS)?, &DataType::Timestamp(TimeUnit::Microsecond, None))?;
    let building = cast(&column(COL_BUILDING_PAID)?, &DataType::Float64)?;
    let contents = cast(&column(COL_CONTENTS_PAID)?, &DataType::Float64)?;
    let states = cast(&column(COL_STATE)?, &DataType::Utf8)?;

    let dates = dates.as_primitive::<TimestampMicrosecondType>();
    let building = building.as_primitive::<Float64Type>();
    let contents = contents.as_primitive::<Float64Type>();
    let states = states.as_string::<i32>();

    let claims = (0..batch.num_rows())
        .map(|row| ClaimRecord {
            claim_id: first_id + row as u64,
            date_of_loss: if dates.is_null(row) {
                None
            } else {
                timestamp_us_to_datetime(dates.value(row))
            },
            state: (!states.is_null(row)).then(|| states.value(row).to_string()),
            building_paid: (!building.is_null(row)).then(|| building.value(row)),
            contents_paid: (!contents.is_null(row)).then(|| contents.value(row)),
        })
        .collect();
    Ok(claims)
}
