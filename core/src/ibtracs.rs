//! IBTrACS v04 track source.
//!
//! Reads the "list" CSV distribution (one row per observation, a header
//! row followed by a units row) and serves it through `TrackSource`.
//! The whole file is loaded once; lookups afterwards are in memory.
//!
//! Data: https://www.ncei.noaa.gov/products/international-best-track-archive

use crate::{
    error::{LinkError, LinkResult, TrackError},
    storm::{StormTrack, TrackSource, UNNAMED},
    types::StormId,
};
use chrono::{NaiveDateTime, Timelike};
use csv::StringRecord;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// IBTrACS spelling of an unnamed system.
const NOT_NAMED: &str = "NOT_NAMED";

/// Statuses that count toward ACE: tropical storm, hurricane, subtropical storm.
const ACE_STATUSES: &[&str] = &["TS", "HU", "SS"];

/// Hours (UTC) of the synoptic observations ACE is summed over.
const SYNOPTIC_HOURS: &[u32] = &[0, 6, 12, 18];

/// Readings below tropical-storm strength (kt) add nothing to ACE.
const ACE_MIN_WIND: f64 = 34.0;

/// Line of the units record that follows the header.
const UNITS_LINE: u64 = 2;

// ── Header ───────────────────────────────────────────────────────────────────

struct Columns {
    sid: usize,
    season: usize,
    name: usize,
    iso_time: usize,
    usa_wind: Option<usize>,
    wmo_wind: Option<usize>,
    usa_status: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> LinkResult<Self> {
        let find = |name: &str| header.iter().position(|n| n == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| LinkError::TrackParse {
                line: 1,
                reason: format!("header has no {name} column"),
            })
        };
        Ok(Self {
            sid: require("SID")?,
            season: require("SEASON")?,
            name: require("NAME")?,
            iso_time: require("ISO_TIME")?,
            usa_wind: find("USA_WIND"),
            wmo_wind: find("WMO_WIND"),
            usa_status: find("USA_STATUS"),
        })
    }

    fn reports_wind(&self) -> bool {
        self.usa_wind.is_some() || self.wmo_wind.is_some()
    }
}

// ── Per-storm accumulation ───────────────────────────────────────────────────

struct TrackBuilder {
    name: String,
    times: Vec<NaiveDateTime>,
    wind: Vec<Option<f64>>,
    ace: f64,
}

impl TrackBuilder {
    fn push(&mut self, time: NaiveDateTime, wind: Option<f64>, status: Option<&str>) {
        if let (Some(v), Some(status)) = (wind, status) {
            let synoptic = time.minute() == 0 && SYNOPTIC_HOURS.contains(&time.hour());
            if synoptic && v >= ACE_MIN_WIND && ACE_STATUSES.contains(&status) {
                self.ace += v * v * 1e-4;
            }
        }
        self.times.push(time);
        self.wind.push(wind);
    }
}

// ── Source ───────────────────────────────────────────────────────────────────

pub struct IbtracsSource {
    tracks: HashMap<StormId, StormTrack>,
    /// Storm ids per season, in file order.
    seasons: BTreeMap<i32, Vec<StormId>>,
    first_season: i32,
    last_season: i32,
}

impl IbtracsSource {
    pub fn open(path: &str) -> LinkResult<Self> {
        let source = Self::from_reader(File::open(path)?)?;
        log::info!(
            "Loaded {} storms ({}-{}) from {path}",
            source.tracks.len(),
            source.first_season,
            source.last_season
        );
        Ok(source)
    }

    pub fn from_reader<R: Read>(reader: R) -> LinkResult<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let header = csv.headers()?.clone();
        if header.is_empty() {
            return Err(LinkError::TrackParse { line: 1, reason: "file is empty".into() });
        }
        let columns = Columns::from_header(&header)?;

        let mut builders: HashMap<StormId, TrackBuilder> = HashMap::new();
        let mut seasons: BTreeMap<i32, Vec<StormId>> = BTreeMap::new();

        for result in csv.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            if line == UNITS_LINE {
                continue;
            }
            let line = usize::try_from(line).unwrap_or(usize::MAX);
            let field = |idx: usize| record.get(idx).unwrap_or("");

            let sid = field(columns.sid);
            if sid.is_empty() {
                continue;
            }
            let season: i32 = field(columns.season).parse().map_err(|_| LinkError::TrackParse {
                line,
                reason: format!("bad SEASON '{}'", field(columns.season)),
            })?;
            let time = NaiveDateTime::parse_from_str(field(columns.iso_time), TIME_FORMAT)
                .map_err(|e| LinkError::TrackParse {
                    line,
                    reason: format!("bad ISO_TIME '{}': {e}", field(columns.iso_time)),
                })?;
            let wind = columns
                .usa_wind
                .and_then(|idx| parse_reading(field(idx)))
                .or_else(|| columns.wmo_wind.and_then(|idx| parse_reading(field(idx))));
            let status = columns.usa_status.map(field).filter(|s| !s.is_empty());

            let builder = builders.entry(sid.to_string()).or_insert_with(|| {
                seasons.entry(season).or_default().push(sid.to_string());
                TrackBuilder {
                    name: normalize_name(field(columns.name)),
                    times: Vec::new(),
                    wind: Vec::new(),
                    ace: 0.0,
                }
            });
            builder.push(time, wind, status);
        }

        let reports_wind = columns.reports_wind();
        let tracks: HashMap<StormId, StormTrack> = builders
            .into_iter()
            .map(|(id, b)| {
                let track = StormTrack {
                    id: id.clone(),
                    name: b.name,
                    times: b.times,
                    wind: reports_wind.then_some(b.wind),
                    ace: reports_wind.then_some(b.ace),
                };
                (id, track)
            })
            .collect();

        let first_season = seasons.keys().next().copied().unwrap_or(0);
        let last_season = seasons.keys().next_back().copied().unwrap_or(-1);

        Ok(Self { tracks, seasons, first_season, last_season })
    }

    pub fn storm_count(&self) -> usize {
        self.tracks.len()
    }

    /// Inclusive season range covered by the file, if it had any rows.
    pub fn coverage(&self) -> Option<(i32, i32)> {
        (self.first_season <= self.last_season).then_some((self.first_season, self.last_season))
    }
}

impl TrackSource for IbtracsSource {
    fn storms_in_season(&self, year: i32) -> Result<Vec<StormId>, TrackError> {
        if year < self.first_season || year > self.last_season {
            return Err(TrackError::SeasonUnavailable { year });
        }
        Ok(self.seasons.get(&year).cloned().unwrap_or_default())
    }

    fn storm(&self, id: &StormId) -> Result<StormTrack, TrackError> {
        self.tracks
            .get(id)
            .cloned()
            .ok_or_else(|| TrackError::StormNotFound { id: id.clone() })
    }
}

/// Blank and non-numeric cells are missing readings.
fn parse_reading(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn normalize_name(raw: &str) -> String {
    if raw.is_empty() || raw == NOT_NAMED {
        UNNAMED.to_string()
    } else {
        raw.to_string()
    }
}
