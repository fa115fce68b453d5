//! Pipeline configuration.
//!
//! Every path and the API URL live in [`PipelineConfig`], which is passed
//! into [`crate::pipeline::run`]. Defaults reproduce the standard run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::transform::rules::ReconciliationRules;

/// World Bank country endpoint (first page, JSON).
pub const DEFAULT_API_URL: &str = "https://api.worldbank.org/v2/country/?format=json";

/// Reference CSV read from the working directory.
pub const DEFAULT_COUNTRIES_CSV: &str = "all_countries.csv";

/// Raw API snapshot written to the working directory.
pub const DEFAULT_JSON_SAVEPATH: &str = "raw_countries.json";

/// Merged output written to the working directory.
pub const DEFAULT_SAVE_PATH: &str = "merged_countries_data.csv";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Inputs and outputs of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Country API endpoint
    pub api_url: String,

    /// Reference CSV to merge with
    pub countries_csv_path: PathBuf,

    /// Where the raw API response is stored
    pub json_savepath: PathBuf,

    /// Where the merged CSV is written
    pub save_path: PathBuf,

    /// Reconciliation rules file; built-in rules when absent
    pub rules_path: Option<PathBuf>,

    /// HTTP request timeout; none waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            countries_csv_path: PathBuf::from(DEFAULT_COUNTRIES_CSV),
            json_savepath: PathBuf::from(DEFAULT_JSON_SAVEPATH),
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            rules_path: None,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl PipelineConfig {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_countries_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.countries_csv_path = path.into();
        self
    }

    pub fn with_json_savepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_savepath = path.into();
        self
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = path.into();
        self
    }

    pub fn with_rules(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Rules for this run: the configured file, or the built-in country rules.
    pub fn load_rules(&self) -> Result<ReconciliationRules, ConfigError> {
        match &self.rules_path {
            Some(path) => load_rules_file(path),
            None => Ok(ReconciliationRules::countries()),
        }
    }
}

/// Read reconciliation rules from a JSON file.
pub fn load_rules_file(path: &Path) -> Result<ReconciliationRules, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ReconciliationRules::from_json(&content).map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.api_url, "https://api.worldbank.org/v2/country/?format=json");
        assert_eq!(config.countries_csv_path, PathBuf::from("all_countries.csv"));
        assert_eq!(config.json_savepath, PathBuf::from("raw_countries.json"));
        assert_eq!(config.save_path, PathBuf::from("merged_countries_data.csv"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(config.rules_path.is_none());
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::default()
            .with_api_url("http://localhost:9/countries")
            .with_save_path("/tmp/out.csv")
            .with_timeout(None);
        assert_eq!(config.api_url, "http://localhost:9/countries");
        assert_eq!(config.save_path, PathBuf::from("/tmp/out.csv"));
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_builtin_rules_without_file() {
        let rules = PipelineConfig::default().load_rules().unwrap();
        assert_eq!(rules, ReconciliationRules::countries());
    }

    #[test]
    fn test_rules_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let mut rules = ReconciliationRules::countries();
        rules.join_key = "alpha2".to_string();
        std::fs::write(&path, rules.to_json().unwrap()).unwrap();

        let loaded = PipelineConfig::default().with_rules(&path).load_rules().unwrap();
        assert_eq!(loaded.join_key, "alpha2");
    }

    #[test]
    fn test_invalid_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_rules_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = load_rules_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
