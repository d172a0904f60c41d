//! Configuration for a shuffle-lunch run.
//!
//! Loaded from `shuffle-lunch.toml` in the working directory when present.
//! Command line flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::condition::DEFAULT_GROUP_SIZE;

pub const DEFAULT_CONFIG_FILE: &str = "shuffle-lunch.toml";
pub const DEFAULT_ROSTER_FILE: &str = "shuffle_lunch_members.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },
    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_roster_path")]
    pub path: PathBuf,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self { path: default_roster_path() }
    }
}

fn default_roster_path() -> PathBuf {
    PathBuf::from(DEFAULT_ROSTER_FILE)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Target members per group; leftovers raise some groups by one.
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    /// Fixed seed for the tie-break shuffle. Random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Runs to try with successive seeds before giving up.
    #[serde(default = "default_attempts")]
    pub attempts: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            seed: None,
            attempts: default_attempts(),
        }
    }
}

fn default_group_size() -> usize {
    DEFAULT_GROUP_SIZE
}
fn default_attempts() -> usize {
    1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

impl Config {
    /// Loads `path`, or the default file when `path` is `None`.
    /// Only the default file may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    tracing::debug!("no config file at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                Self::load_from(path)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allocation.group_size == 0 {
            return Err(ConfigError::Invalid("allocation.group_size must be at least 1".into()));
        }
        if self.allocation.attempts == 0 {
            return Err(ConfigError::Invalid("allocation.attempts must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.allocation.group_size, 5);
        assert_eq!(config.allocation.attempts, 1);
        assert_eq!(config.roster.path, PathBuf::from("shuffle_lunch_members.csv"));
        assert_eq!(config.report.format, ReportFormat::Text);
    }

    #[test]
    fn parses_all_sections() {
        let config: Config = toml::from_str(
            r#"
            [roster]
            path = "members.csv"

            [allocation]
            group_size = 4
            seed = 42
            attempts = 3

            [report]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.roster.path, PathBuf::from("members.csv"));
        assert_eq!(config.allocation.group_size, 4);
        assert_eq!(config.allocation.seed, Some(42));
        assert_eq!(config.allocation.attempts, 3);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_group_size_is_invalid() {
        let config: Config = toml::from_str("[allocation]\ngroup_size = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/shuffle-lunch.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
