//! Columnar storm catalog file.
//!
//! The catalog is written to Parquet once per run and read back before
//! linking, so later runs (and external tools) can reuse it. Dates are
//! stored as microsecond timestamps without a zone; the round trip is
//! exact for every value the builder produces.

use crate::{
    error::{LinkError, LinkResult},
    storm::{StormCatalog, StormEvent},
};
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray, TimestampMicrosecondArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Schema, TimeUnit, TimestampMicrosecondType};
use arrow::record_batch::RecordBatch;
use arrow::temporal_conversions::timestamp_us_to_datetime;
use chrono::NaiveDateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub const COL_EVENT_NAME: &str = "EventName";
pub const COL_START_DATE: &str = "start_date";
pub const COL_END_DATE: &str = "end_date";
pub const COL_ACE: &str = "ACE";
pub const COL_MAX_WIND: &str = "MaxWind";

const TIMESTAMP: DataType = DataType::Timestamp(TimeUnit::Microsecond, None);

pub fn catalog_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(COL_EVENT_NAME, DataType::Utf8, false),
        Field::new(COL_START_DATE, TIMESTAMP, false),
        Field::new(COL_END_DATE, TIMESTAMP, false),
        Field::new(COL_ACE, DataType::Float64, false),
        Field::new(COL_MAX_WIND, DataType::Float64, false),
    ]))
}

pub fn write_catalog(path: impl AsRef<Path>, catalog: &StormCatalog) -> LinkResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let events = catalog.events();
    let names = StringArray::from(events.iter().map(|e| e.event_name.as_str()).collect::<Vec<_>>());
    let starts = TimestampMicrosecondArray::from(
        events.iter().map(|e| to_micros(e.start_date)).collect::<Vec<_>>(),
    );
    let ends = TimestampMicrosecondArray::from(
        events.iter().map(|e| to_micros(e.end_date)).collect::<Vec<_>>(),
    );
    let aces = Float64Array::from(events.iter().map(|e| e.ace).collect::<Vec<_>>());
    let winds = Float64Array::from(events.iter().map(|e| e.max_wind).collect::<Vec<_>>());

    let schema = catalog_schema();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(names),
            Arc::new(starts),
            Arc::new(ends),
            Arc::new(aces),
            Arc::new(winds),
        ],
    )?;

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    log::info!("Storm catalog written: {} events -> {}", events.len(), path.display());
    Ok(())
}

pub fn read_catalog(path: impl AsRef<Path>) -> LinkResult<StormCatalog> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut events = Vec::new();
    for batch in reader {
        let batch = batch?;
        let column = |name: &str| -> LinkResult<ArrayRef> {
            batch.column_by_name(name).cloned().ok_or_else(|| LinkError::MissingColumn {
                column: name.to_string(),
                path: path.display().to_string(),
            })
        };

        let names = cast(&column(COL_EVENT_NAME)?, &DataType::Utf8)?;
        let starts = cast(&column(COL_START_DATE)?, &TIMESTAMP)?;
        let ends = cast(&column(COL_END_DATE)?, &TIMESTAMP)?;
        let aces = cast(&column(COL_ACE)?, &DataType::Float64)?;
        let winds = cast(&column(COL_MAX_WIND)?, &DataType::Float64)?;

        let names = names.as_string::<i32>();
        let starts = starts.as_primitive::<TimestampMicrosecondType>();
        let ends = ends.as_primitive::<TimestampMicrosecondType>();
        let aces = aces.as_primitive::<Float64Type>();
        let winds = winds.as_primitive::<Float64Type>();

        for row in 0..batch.num_rows() {
            // Rows without a name or a window cannot be linked against.
            if names.is_null(row) || starts.is_null(row) || ends.is_null(row) {
                log::warn!("Catalog row {row} in {} is incomplete, skipped", path.display());
                continue;
            }
            let (Some(start_date), Some(end_date)) = (
                timestamp_us_to_datetime(starts.value(row)),
                timestamp_us_to_datetime(ends.value(row)),
            ) else {
                log::warn!(
                    "Catalog row {row} in {} has a timestamp out of range, skipped",
                    path.display()
                );
                continue;
            };
            events.push(StormEvent {
                event_name: names.value(row).to_string(),
                start_date,
                end_date,
                ace: if aces.is_null(row) { 0.0 } else { aces.value(row) },
                max_wind: if winds.is_null(row) { 0.0 } else { winds.value(row) },
            });
        }
    }

    log::info!("Storm catalog read: {} events <- {}", events.len(), path.display());
    Ok(StormCatalog::new(events))
}

fn to_micros(at: NaiveDateTime) -> i64 {
    at.and_utc().timestamp_micros()
}
