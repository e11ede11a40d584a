//! Stage configuration from environment variables and the definitions file

use crate::aggregate::{AggregateDefinition, AggregateError};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
    Io(std::io::Error),
    Parse(serde_json::Error),
    Aggregate(AggregateError),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<AggregateError> for ConfigError {
    fn from(err: AggregateError) -> Self {
        ConfigError::Aggregate(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
            ConfigError::Io(e) => write!(f, "Cannot read definitions: {}", e),
            ConfigError::Parse(e) => write!(f, "Cannot parse definitions: {}", e),
            ConfigError::Aggregate(e) => write!(f, "Invalid aggregate definition: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for the aggregation stage runtime
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    /// JSON file holding the aggregate definitions
    pub definitions_path: PathBuf,

    /// Records per batch
    pub batch_size: usize,

    /// Flush interval for partial batches in milliseconds
    pub flush_interval_ms: u64,

    /// JSONL output file; stdout when `None`
    pub output_path: Option<PathBuf>,
}

impl StageConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `FLOWAGG_DEFINITIONS_PATH` (required)
    /// - `FLOWAGG_BATCH_SIZE` (default: 1000)
    /// - `FLOWAGG_FLUSH_INTERVAL_MS` (default: 5000)
    /// - `FLOWAGG_OUTPUT_PATH` (default: stdout)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let definitions_path: PathBuf = lookup("FLOWAGG_DEFINITIONS_PATH")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVariable("FLOWAGG_DEFINITIONS_PATH".to_string()))?
            .into();

        let batch_size: usize = lookup("FLOWAGG_BATCH_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1_000);
        if batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "FLOWAGG_BATCH_SIZE must be greater than 0".to_string(),
            ));
        }

        let flush_interval_ms: u64 = lookup("FLOWAGG_FLUSH_INTERVAL_MS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(5_000);
        if flush_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "FLOWAGG_FLUSH_INTERVAL_MS must be greater than 0".to_string(),
            ));
        }

        let output_path = lookup("FLOWAGG_OUTPUT_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            definitions_path,
            batch_size,
            flush_interval_ms,
            output_path,
        })
    }
}

/// Parse and validate a JSON array of aggregate definitions
pub fn parse_definitions(json: &str) -> Result<Vec<AggregateDefinition>, ConfigError> {
    let definitions: Vec<AggregateDefinition> = serde_json::from_str(json)?;
    for definition in &definitions {
        definition.validate()?;
    }
    Ok(definitions)
}

pub fn load_definitions(path: &Path) -> Result<Vec<AggregateDefinition>, ConfigError> {
    let json = std::fs::read_to_string(path)?;
    parse_definitions(&json)
}
