//! Configuration file schema for umpyre.
//!
//! A config file is optional. When present it names the collector, the
//! directory names to exclude and the per-file size limit.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::DEFAULT_MAX_FILE_SIZE;
use crate::collector::{CollectorOptions, SEQUENTIAL_COLLECTOR};

/// Config file names searched for in the working directory, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["umpyre.yaml", ".umpyre.yaml"];

/// Invalid configuration values.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("collector name must not be empty")]
    EmptyCollector,
    #[error("max_file_size must be greater than zero")]
    ZeroFileSize,
    #[error("invalid exclude_dirs entry {0:?}: must be a single directory name")]
    InvalidExclude(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Registered collector name (default: "umpyre_stats").
    #[serde(default)]
    pub collector: Option<String>,
    /// Directory names to skip, e.g. ["tests", "examples"].
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    /// Per-file read limit in bytes.
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Find a config file in `dir`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Load an explicit config file, or a discovered one, or the defaults.
    pub fn load(explicit: Option<&Path>, search_dir: &Path) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match Self::discover(search_dir) {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        tracing::debug!("Loading config from {}", path.display());
        Self::parse_file(&path)
            .map_err(|e| anyhow::anyhow!("parsing config {}: {}", path.display(), e))
    }

    /// Collector name (defaults to the sequential collector).
    pub fn collector_name(&self) -> &str {
        self.collector.as_deref().unwrap_or(SEQUENTIAL_COLLECTOR)
    }

    /// Per-file read limit (defaults to 10 MiB).
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Collector options rooted at `root`.
    pub fn to_options<P: AsRef<Path>>(&self, root: P) -> CollectorOptions {
        CollectorOptions::new(root)
            .with_exclude_dirs(self.exclude_dirs.iter().cloned())
            .with_max_file_size(self.max_file_size())
    }
}

/// Check config values.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.collector_name().trim().is_empty() {
        return Err(ConfigError::EmptyCollector);
    }

    if config.max_file_size == Some(0) {
        return Err(ConfigError::ZeroFileSize);
    }

    // Exclusions match single path components, so separators never match.
    for dir in &config.exclude_dirs {
        if dir.trim().is_empty() || dir.contains('/') || dir.contains('\\') {
            return Err(ConfigError::InvalidExclude(dir.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
collector: umpyre_stats_parallel
exclude_dirs:
  - tests
  - examples
max_file_size: 2048
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert_eq!(config.collector_name(), "umpyre_stats_parallel");
        assert_eq!(config.exclude_dirs, vec!["tests", "examples"]);
        assert_eq!(config.max_file_size(), 2048);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse_str("").unwrap();
        assert_eq!(config.collector_name(), SEQUENTIAL_COLLECTOR);
        assert!(config.exclude_dirs.is_empty());
        assert_eq!(config.max_file_size(), DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            collector: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(validate(&config), Err(ConfigError::EmptyCollector));

        let config = Config {
            max_file_size: Some(0),
            ..Default::default()
        };
        assert_eq!(validate(&config), Err(ConfigError::ZeroFileSize));

        let config = Config {
            exclude_dirs: vec!["pkg/tests".to_string()],
            ..Default::default()
        };
        assert_eq!(
            validate(&config),
            Err(ConfigError::InvalidExclude("pkg/tests".to_string()))
        );
    }

    #[test]
    fn test_discover_and_load() {
        let temp = TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());
        assert_eq!(Config::load(None, temp.path()).unwrap(), Config::default());

        std::fs::write(temp.path().join(".umpyre.yaml"), "exclude_dirs: [build]\n").unwrap();
        let found = Config::discover(temp.path()).unwrap();
        assert!(found.ends_with(".umpyre.yaml"));

        let config = Config::load(None, temp.path()).unwrap();
        assert_eq!(config.exclude_dirs, vec!["build"]);
    }

    #[test]
    fn test_load_reports_bad_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("umpyre.yaml");
        std::fs::write(&path, "exclude_dirs: {not: [a list\n").unwrap();
        let err = Config::load(Some(&path), temp.path()).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }

    #[test]
    fn test_to_options() {
        let config = Config {
            exclude_dirs: vec!["tests".to_string()],
            max_file_size: Some(100),
            ..Default::default()
        };
        let options = config.to_options("/project");
        assert_eq!(options.root, PathBuf::from("/project"));
        assert_eq!(options.exclude_dirs, vec!["tests"]);
        assert_eq!(options.max_file_size, 100);
    }
}
