//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use arrow::array::{Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stormlink_core::{
    claims::ClaimRecord,
    error::TrackError,
    storm::{StormCatalog, StormEvent, StormTrack, TrackSource},
    types::StormId,
};

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    at(y, m, d, 0)
}

/// A unique path under the system temp dir. The file is not created.
pub fn temp_path(stem: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("stormlink-{stem}-{}.{ext}", uuid::Uuid::new_v4()))
}

pub fn storm(name: &str, start: NaiveDateTime, end: NaiveDateTime, max_wind: f64, ace: f64) -> StormEvent {
    StormEvent {
        event_name: name.to_string(),
        start_date: start,
        end_date: end,
        ace,
        max_wind,
    }
}

pub fn claim(id: u64, date: Option<NaiveDateTime>, building: Option<f64>, contents: Option<f64>) -> ClaimRecord {
    ClaimRecord {
        claim_id: id,
        date_of_loss: date,
        state: Some("FL".to_string()),
        building_paid: building,
        contents_paid: contents,
    }
}

/// ALPHA_2021 (Aug 1-10, wind 120) plus a late storm so the reference
/// year is 2026.
pub fn alpha_catalog() -> StormCatalog {
    StormCatalog::new(vec![
        storm("ALPHA_2021", day(2021, 8, 1), day(2021, 8, 10), 120.0, 15.0),
        storm("OMEGA_2025", day(2025, 10, 1), day(2025, 10, 9), 60.0, 3.0),
    ])
}

// ── Claims Parquet ───────────────────────────────────────────────────────────

/// One claims row: date string, building paid, contents paid, state.
pub type ClaimRow<'a> = (Option<&'a str>, Option<f64>, Option<f64>, Option<&'a str>);

/// Write a claims file shaped like the public dataset: dates as strings,
/// amounts nullable, plus a column the scanner never reads.
pub fn write_claims(path: &Path, rows: &[ClaimRow]) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("policyCount", DataType::Int32, true),
        Field::new("dateOfLoss", DataType::Utf8, true),
        Field::new("amountPaidOnBuildingClaim", DataType::Float64, true),
        Field::new("amountPaidOnContentsClaim", DataType::Float64, true),
        Field::new("state", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(vec![Some(1); rows.len()])),
            Arc::new(StringArray::from(rows.iter().map(|r| r.0).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.1).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.3).collect::<Vec<_>>())),
        ],
    )
    .expect("claims batch");

    let file = File::create(path).expect("create claims file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("claims writer");
    writer.write(&batch).expect("write claims");
    writer.close().expect("close claims");
}

// ── Track source ─────────────────────────────────────────────────────────────

/// In-memory `TrackSource`. Seasons not registered have no storms.
#[derive(Default)]
pub struct FakeTracks {
    seasons: BTreeMap<i32, Result<Vec<StormId>, TrackError>>,
    tracks: HashMap<StormId, Result<StormTrack, TrackError>>,
}

impl FakeTracks {
    pub fn with_storm(mut self, season: i32, track: StormTrack) -> Self {
        let ids = self.seasons.entry(season).or_insert_with(|| Ok(Vec::new()));
        if let Ok(ids) = ids {
            ids.push(track.id.clone());
        }
        self.tracks.insert(track.id.clone(), Ok(track));
        self
    }

    pub fn with_broken_storm(mut self, season: i32, id: &str) -> Self {
        let ids = self.seasons.entry(season).or_insert_with(|| Ok(Vec::new()));
        if let Ok(ids) = ids {
            ids.push(id.to_string());
        }
        self.tracks.insert(
            id.to_string(),
            Err(TrackError::Malformed { id: id.to_string(), reason: "truncated record".into() }),
        );
        self
    }

    pub fn with_failing_season(mut self, season: i32) -> Self {
        self.seasons.insert(season, Err(TrackError::SeasonUnavailable { year: season }));
        self
    }
}

impl TrackSource for FakeTracks {
    fn storms_in_season(&self, year: i32) -> Result<Vec<StormId>, TrackError> {
        self.seasons.get(&year).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn storm(&self, id: &StormId) -> Result<StormTrack, TrackError> {
        self.tracks
            .get(id)
            .cloned()
            .unwrap_or_else(|| Err(TrackError::StormNotFound { id: id.clone() }))
    }
}

pub fn track(id: &str, name: &str, times: Vec<NaiveDateTime>, wind: Option<Vec<Option<f64>>>, ace: Option<f64>) -> StormTrack {
    StormTrack {
        id: id.to_string(),
        name: name.to_string(),
        times,
        wind,
        ace,
    }
}
