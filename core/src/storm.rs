//! Storm catalog: named storm windows with intensity metrics.
//!
//! The builder asks a `TrackSource` for every season in the configured
//! range, drops unnamed systems, and widens each storm's observed
//! lifetime by the configured buffer days.
//!
//! RULE: a failing season never fails the build. It is logged, recorded
//! in `CatalogBuild::skipped_seasons`, and the next season is tried.
//!
//! RULE: `event_name` is unique within a catalog. A later storm that
//! produces a name already taken is logged and counted as skipped.

use crate::{
    config::CatalogConfig,
    error::TrackError,
    types::{EventName, StormId},
};
use chrono::{Datelike, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name the track data uses for systems that were never named.
pub const UNNAMED: &str = "UNNAMED";

// ── Provider contract ────────────────────────────────────────────────────────

/// One storm's observation record as supplied by a track provider.
#[derive(Debug, Clone, PartialEq)]
pub struct StormTrack {
    pub id: StormId,
    pub name: String,
    pub times: Vec<NaiveDateTime>,
    /// Per-observation maximum sustained wind (knots), if the provider
    /// reports wind at all. Individual readings may be missing.
    pub wind: Option<Vec<Option<f64>>>,
    /// Accumulated cyclone energy, if the provider reports it.
    pub ace: Option<f64>,
}

/// Source of storm identities and observation tracks.
pub trait TrackSource {
    /// Storms active in `year`. `Ok(vec![])` means the season had none.
    fn storms_in_season(&self, year: i32) -> Result<Vec<StormId>, TrackError>;

    fn storm(&self, id: &StormId) -> Result<StormTrack, TrackError>;
}

// ── Catalog types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormEvent {
    pub event_name: EventName,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub ace: f64,
    pub max_wind: f64,
}

impl StormEvent {
    /// Inclusive on both ends.
    pub fn covers(&self, at: NaiveDateTime) -> bool {
        self.start_date <= at && at <= self.end_date
    }
}

/// Storm events in ascending `start_date` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StormCatalog {
    events: Vec<StormEvent>,
}

impl StormCatalog {
    /// Stable sort: events sharing a `start_date` keep their input order.
    pub fn new(mut events: Vec<StormEvent>) -> Self {
        events.sort_by_key(|e| e.start_date);
        Self { events }
    }

    pub fn events(&self) -> &[StormEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StormEvent> {
        self.events.get(index)
    }

    /// One year past the latest window end. `None` for an empty catalog.
    pub fn reference_year(&self) -> Option<i32> {
        self.events.iter().map(|e| e.end_date.year()).max().map(|y| y + 1)
    }

    pub fn find(&self, event_name: &str) -> Option<&StormEvent> {
        self.events.iter().find(|e| e.event_name == event_name)
    }
}

/// Result of a catalog build.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuild {
    pub catalog: StormCatalog,
    /// Seasons whose storm lookup failed.
    pub skipped_seasons: Vec<i32>,
    /// Storms whose individual fetch failed, that had no observations,
    /// or whose event name was already taken.
    pub skipped_storms: usize,
    pub unnamed_storms: usize,
}

// ── Builder ──────────────────────────────────────────────────────────────────

pub fn build_catalog(source: &dyn TrackSource, config: &CatalogConfig) -> CatalogBuild {
    let mut events = Vec::new();
    let mut names: HashSet<EventName> = HashSet::new();
    let mut build = CatalogBuild::default();

    for year in config.start_year..=config.end_year {
        let ids = match source.storms_in_season(year) {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("Season {year} skipped: {e}");
                build.skipped_seasons.push(year);
                continue;
            }
        };
        if ids.is_empty() {
            log::debug!("Season {year} has no storms");
            continue;
        }

        for id in &ids {
            let track = match source.storm(id) {
                Ok(track) => track,
                Err(e) => {
                    log::warn!("Storm {id} ({year}) skipped: {e}");
                    build.skipped_storms += 1;
                    continue;
                }
            };
            if track.name == UNNAMED {
                build.unnamed_storms += 1;
                continue;
            }
            match storm_event(&track, year, config) {
                Some(event) if !names.insert(event.event_name.clone()) => {
                    log::warn!("Storm {id} ({year}) skipped: duplicate event name {}", event.event_name);
                    build.skipped_storms += 1;
                }
                Some(event) => events.push(event),
                None => {
                    log::debug!("Storm {id} ({year}) has no observations");
                    build.skipped_storms += 1;
                }
            }
        }
    }

    build.catalog = StormCatalog::new(events);
    log::info!(
        "Storm catalog built: {} events, {} seasons skipped, {} storms skipped",
        build.catalog.len(),
        build.skipped_seasons.len(),
        build.skipped_storms
    );
    build
}

/// Window and metrics for one track. `None` if the track has no times.
pub fn storm_event(track: &StormTrack, season: i32, config: &CatalogConfig) -> Option<StormEvent> {
    let first = track.times.iter().min()?;
    let last = track.times.iter().max()?;

    Some(StormEvent {
        event_name: format!("{}_{}", track.name, season),
        start_date: *first - Duration::days(i64::from(config.days_before)),
        end_date: *last + Duration::days(i64::from(config.days_after)),
        ace: track.ace.filter(|a| a.is_finite()).unwrap_or(0.0),
        max_wind: max_wind(track.wind.as_deref()),
    })
}

/// Largest reading, ignoring missing and NaN values. 0 when none remain.
fn max_wind(readings: Option<&[Option<f64>]>) -> f64 {
    readings
        .into_iter()
        .flatten()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
        .unwrap_or(0.0)
}
