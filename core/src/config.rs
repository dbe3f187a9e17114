use crate::error::{LinkError, LinkResult};
use serde::{Deserialize, Serialize};

// ── Storm catalog ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// Days added before the first observation of a storm.
    pub days_before: u32,
    /// Days added after the last observation of a storm.
    pub days_after: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            start_year: 2000,
            end_year: 2024,
            days_before: 3,
            days_after: 5,
        }
    }
}

// ── Inflation ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InflationConfig {
    /// Growth factor per year, 1.03 = 3% annual.
    pub annual_rate: f64,
}

impl Default for InflationConfig {
    fn default() -> Self {
        Self { annual_rate: 1.03 }
    }
}

// ── Linking ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    /// Index storms under every year their window touches instead of
    /// only the year of `start_date`. Off by default: a December storm
    /// whose window runs into January will not see January claims.
    #[serde(default)]
    pub cross_year_windows: bool,
}

// ── Claims scan ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    pub batch_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { batch_size: 65_536 }
    }
}

// ── Reporting ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    pub top_storms: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_storms: 30 }
    }
}

// ── File locations ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathConfig {
    /// IBTrACS v04 list CSV.
    pub tracks: String,
    /// Claims dataset (Parquet).
    pub claims: String,
    /// Storm catalog written and re-read every run (Parquet).
    pub catalog: String,
    /// SQLite results database.
    pub results_db: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            tracks: "data/ibtracs.NA.list.v04r00.csv".into(),
            claims: "data/FimaNfipClaimsV2.parquet".into(),
            catalog: "data/storms_catalog.parquet".into(),
            results_db: "stormlink.db".into(),
        }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub inflation: InflationConfig,
    #[serde(default)]
    pub linking: LinkConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

impl PipelineConfig {
    /// Load a JSON config file. Sections left out fall back to defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LinkResult<()> {
        if self.catalog.start_year > self.catalog.end_year {
            return Err(LinkError::InvalidConfig(format!(
                "catalog.start_year {} is after catalog.end_year {}",
                self.catalog.start_year, self.catalog.end_year
            )));
        }
        let rate = self.inflation.annual_rate;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(LinkError::InvalidConfig(format!(
                "inflation.annual_rate must be a positive number, got {rate}"
            )));
        }
        if self.scan.batch_size == 0 {
            return Err(LinkError::InvalidConfig("scan.batch_size must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_historical_analysis_window() {
        let config = PipelineConfig::default();
        assert_eq!(config.catalog.start_year, 2000);
        assert_eq!(config.catalog.end_year, 2024);
        assert_eq!(config.catalog.days_before, 3);
        assert_eq!(config.catalog.days_after, 5);
        assert_eq!(config.inflation.annual_rate, 1.03);
        assert!(!config.linking.cross_year_windows);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_missing_sections() {
        let json = r#"{ "catalog": { "start_year": 2005, "end_year": 2005,
                                     "days_before": 1, "days_after": 2 } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.catalog.start_year, 2005);
        assert_eq!(config.report.top_storms, 30);
        assert_eq!(config.paths, PathConfig::default());
    }

    #[test]
    fn shipped_config_file_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/pipeline.json");
        let config = PipelineConfig::load(path).expect("data/pipeline.json loads");
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn inverted_year_range_is_rejected() {
        let mut config = PipelineConfig::default();
        config.catalog.start_year = 2025;
        assert!(matches!(config.validate(), Err(LinkError::InvalidConfig(_))));
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        let mut config = PipelineConfig::default();
        config.inflation.annual_rate = 0.0;
        assert!(config.validate().is_err());
        config.inflation.annual_rate = f64::NAN;
        assert!(config.validate().is_err());
    }
}
