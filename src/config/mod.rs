use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::analysis::decomposition::DecompositionModel;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PRICE_EDA_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/eda.yaml";

/// Config file location: the value of [`CONFIG_ENV`] when set and non-empty,
/// otherwise [`DEFAULT_CONFIG_PATH`].
pub fn config_path(env_value: Option<String>) -> PathBuf {
    env_value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub path: PathBuf,
    pub date_column: String,
    pub legacy_close_label: String,
    pub price_columns: Vec<String>,
    pub currency_symbol: char,
    pub date_formats: Vec<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/HistoricalData.csv"),
            date_column: "Date".to_string(),
            legacy_close_label: "Close/Last".to_string(),
            price_columns: ["Close", "Open", "High", "Low"].map(String::from).to_vec(),
            currency_symbol: '$',
            date_formats: ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%Y%m%d"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub window: usize,
    pub simple_returns: bool,
    pub seasonal_period: usize,
    pub decomposition_model: DecompositionModel,
    pub max_lags: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            window: 20,
            simple_returns: true,
            seasonal_period: 252,
            decomposition_model: DecompositionModel::Multiplicative,
            max_lags: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl ChartSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub output_dir: PathBuf,
    pub line_size: ChartSize,
    pub volatility_size: ChartSize,
    pub decomposition_size: ChartSize,
    pub correlogram_size: ChartSize,
    pub histogram_size: ChartSize,
    pub histogram_bins: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("charts"),
            line_size: ChartSize::new(1400, 600),
            volatility_size: ChartSize::new(1400, 400),
            decomposition_size: ChartSize::new(1400, 1000),
            correlogram_size: ChartSize::new(1600, 500),
            histogram_size: ChartSize::new(1000, 500),
            histogram_bins: 100,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSettings,
    pub analysis: AnalysisSettings,
    pub charts: ChartSettings,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to the defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Replaces the configured data path when `path` is given.
    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.data.path = path;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.window == 0 {
            return Err(ConfigError::Invalid("analysis.window must be at least 1".into()));
        }
        if self.analysis.seasonal_period < 2 {
            return Err(ConfigError::Invalid(
                "analysis.seasonal_period must be at least 2".into(),
            ));
        }
        if self.analysis.max_lags == 0 {
            return Err(ConfigError::Invalid("analysis.max_lags must be at least 1".into()));
        }
        if self.charts.histogram_bins == 0 {
            return Err(ConfigError::Invalid(
                "charts.histogram_bins must be at least 1".into(),
            ));
        }
        if self.data.date_formats.is_empty() {
            return Err(ConfigError::Invalid("data.date_formats is empty".into()));
        }

        let sizes = [
            ("line_size", self.charts.line_size),
            ("volatility_size", self.charts.volatility_size),
            ("decomposition_size", self.charts.decomposition_size),
            ("correlogram_size", self.charts.correlogram_size),
            ("histogram_size", self.charts.histogram_size),
        ];
        for (name, size) in sizes {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Invalid(format!("charts.{} has a zero dimension", name)));
            }
        }
        Ok(())
    }
}
