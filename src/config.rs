//! Configuration loader - YAML dashboard settings + .env overrides

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration loaded from dashboard.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub charts: ChartsConfig,
    /// Duration of the bar chart sort transition
    pub sort_duration_ms: u64,
}

/// Where the survey CSV comes from: a file path or an http(s) URL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: "data/mxmh_survey_results.csv".to_string(),
        }
    }
}

/// Sizing contract of a single chart, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartSize {
    pub width: f32,
    pub height: f32,
}

impl ChartSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub bar: ChartSize,
    pub scatter: ChartSize,
    pub parallel: ChartSize,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            bar: ChartSize::new(600.0, 300.0),
            scatter: ChartSize::new(400.0, 300.0),
            parallel: ChartSize::new(1200.0, 600.0),
        }
    }
}

/// Environment overrides loaded from .env
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub csv_source: Option<String>,
    pub log_dir: String,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        if config.sort_duration_ms == 0 {
            config.sort_duration_ms = DEFAULT_SORT_DURATION_MS;
        }
        Ok(config)
    }

    /// Built-in chart sizes and data location
    pub fn with_defaults() -> Self {
        Self {
            sort_duration_ms: DEFAULT_SORT_DURATION_MS,
            ..Default::default()
        }
    }

    /// Apply .env overrides on top of the file config
    pub fn apply_env(&mut self, env: &Environment) {
        if let Some(source) = &env.csv_source {
            tracing::debug!("CSV source overridden by MXMH_CSV: {}", source);
            self.data.source = source.clone();
        }
    }

    pub fn sort_duration_secs(&self) -> f32 {
        self.sort_duration_ms as f32 / 1000.0
    }
}

const DEFAULT_SORT_DURATION_MS: u64 = 750;

impl Environment {
    /// Load overrides from .env file
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Environment {
            csv_source: std::env::var("MXMH_CSV").ok().filter(|s| !s.trim().is_empty()),
            log_dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        }
    }
}
