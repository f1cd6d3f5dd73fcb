// ⚙️ Configuration - environment (and .env) driven settings

use crate::cache::CACHE_DURATION_SECS;
use crate::rate_limit::DEFAULT_RATE_PER_SEC;
use crate::source::{AirtableSource, ConfiguredSource, CsvSource};
use anyhow::Result;
use std::path::PathBuf;

pub const DEFAULT_AIRTABLE_API_BASE: &str = "https://api.airtable.com";
pub const DEFAULT_AIRTABLE_TABLE: &str = "WorldGPA";
pub const DEFAULT_AIRTABLE_VIEW: &str = "Grid view";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirtableConfig {
    pub api_base: String,
    pub api_key: String,
    pub base_id: String,
    pub table: String,
    pub view: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Set when AIRTABLE_API_KEY and AIRTABLE_BASE_ID are both present
    pub airtable: Option<AirtableConfig>,
    /// Local CSV export; wins over Airtable when set
    pub csv_path: Option<PathBuf>,
    pub addr: String,
    pub cache_secs: i64,
    pub rate_per_sec: u32,
}

impl Config {
    /// Read configuration from the process environment, after loading `.env`
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let airtable = match (get("AIRTABLE_API_KEY"), get("AIRTABLE_BASE_ID")) {
            (Some(api_key), Some(base_id)) => Some(AirtableConfig {
                api_base: get("AIRTABLE_API_BASE").unwrap_or_else(|| DEFAULT_AIRTABLE_API_BASE.to_string()),
                api_key,
                base_id,
                table: get("AIRTABLE_TABLE").unwrap_or_else(|| DEFAULT_AIRTABLE_TABLE.to_string()),
                view: get("AIRTABLE_VIEW").unwrap_or_else(|| DEFAULT_AIRTABLE_VIEW.to_string()),
            }),
            _ => None,
        };

        let cache_secs = match get("WORLD_GPA_CACHE_SECS") {
            None => CACHE_DURATION_SECS,
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|v| *v >= 0)
                .ok_or(ConfigError::Invalid {
                    name: "WORLD_GPA_CACHE_SECS",
                    value,
                })?,
        };

        let rate_per_sec = match get("WORLD_GPA_RATE_PER_SEC") {
            None => DEFAULT_RATE_PER_SEC,
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::Invalid {
                    name: "WORLD_GPA_RATE_PER_SEC",
                    value,
                })?,
        };

        Ok(Config {
            airtable,
            csv_path: get("GRADE_TABLE_CSV").map(PathBuf::from),
            addr: get("WORLD_GPA_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            cache_secs,
            rate_per_sec,
        })
    }

    /// Same configuration reading tables from `path` instead
    pub fn with_csv(mut self, path: PathBuf) -> Self {
        self.csv_path = Some(path);
        self
    }

    /// Pick the table source: CSV if configured, else Airtable
    pub fn build_source(&self) -> Result<ConfiguredSource> {
        if let Some(path) = &self.csv_path {
            return Ok(ConfiguredSource::Csv(CsvSource::new(path)));
        }

        let airtable = self
            .airtable
            .as_ref()
            .ok_or(ConfigError::Missing("AIRTABLE_API_KEY / AIRTABLE_BASE_ID (or GRADE_TABLE_CSV)"))?;

        let source = AirtableSource::new(
            &airtable.api_base,
            &airtable.api_key,
            &airtable.base_id,
            &airtable.table,
            &airtable.view,
        )?;
        Ok(ConfiguredSource::Airtable(source))
    }
}

// ============================================================================
// TESTS
// ============================================================================
