//! Command line and settings file.
//!
//! Settings resolve in three layers: built-in defaults, then an optional JSON
//! file given with `--config`, then explicit flags.

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_DATA_PATH: &str = "data/dim_groups.csv";
pub const DEFAULT_YEAR: i32 = 2024;
pub const DEFAULT_MONTH: u32 = 10;
pub const DEFAULT_MIN_SIZE: i64 = 50;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Month must be within 1..=12, got {0}")]
    InvalidMonth(u32),
}

/// Report output format.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "groupstats",
    version,
    about = "Participant and message statistics for chat groups created in one month"
)]
pub struct Cli {
    /// Group export CSV [default: data/dim_groups.csv]
    pub path: Option<PathBuf>,
    /// Creation year to select [default: 2024]
    #[arg(long)]
    pub year: Option<i32>,
    /// Creation month to select, 1-12 [default: 10]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
    /// Groups with more participants than this count as large [default: 50]
    #[arg(long)]
    pub min_size: Option<i64>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// JSON settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings of one analysis run.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub data_path: PathBuf,
    pub year: i32,
    pub month: u32,
    pub min_size: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            year: DEFAULT_YEAR,
            month: DEFAULT_MONTH,
            min_size: DEFAULT_MIN_SIZE,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !(1..=12).contains(&self.month) {
            return Err(ConfigError::InvalidMonth(self.month));
        }
        Ok(self)
    }
}

impl Cli {
    /// Merge flags over the settings file (if any) over the defaults.
    pub fn resolve(&self) -> Result<AnalysisConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(path) = &self.path {
            config.data_path = path.clone();
        }
        if let Some(year) = self.year {
            config.year = year;
        }
        if let Some(month) = self.month {
            config.month = month;
        }
        if let Some(min_size) = self.min_size {
            config.min_size = min_size;
        }

        Ok(config)
    }
}
