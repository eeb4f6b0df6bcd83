//! JSON config file loading.
//!
//! All commands that touch the database or GitHub take `--config <path>`;
//! nothing is read from the environment.

use crate::error::{CritError, Result};
use serde::Deserialize;
use std::path::Path;

fn default_workers() -> usize {
    10
}

/// Runtime configuration, deserialized from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the SQLite database file.
    pub database: String,

    /// OAuth token for the GitHub REST API. Optional; without it the
    /// enricher runs unauthenticated and hits rate limits much sooner.
    #[serde(rename = "githubToken", default)]
    pub github_token: Option<String>,

    /// Worker count for the upstream enricher.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CritError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|e| CritError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if config.database.is_empty() {
            return Err(CritError::Config {
                path: path.display().to_string(),
                reason: "missing database path".to_string(),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"database": "crit.db", "githubToken": "ghp_x", "workers": 4}}"#
        )
        .unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database, "crit.db");
        assert_eq!(config.github_token.as_deref(), Some("ghp_x"));
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"database": "crit.db"}}"#).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert!(config.github_token.is_none());
        assert_eq!(config.workers, 10);
    }

    #[test]
    fn empty_database_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"database": ""}}"#).unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
