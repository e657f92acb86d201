use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use speech_eval_core::intent::infrastructure::luis_intent_scorer::LuisSettings;
use speech_eval_core::shared::constants::{DEFAULT_INTENT_THRESHOLD, DEFAULT_REQUEST_INTERVAL_MS};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Service settings that do not belong on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub luis: LuisSettings,
    pub request_interval_ms: u64,
    pub threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            luis: LuisSettings::default(),
            request_interval_ms: DEFAULT_REQUEST_INTERVAL_MS,
            threshold: DEFAULT_INTENT_THRESHOLD,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("SpeechEval").join("config.json"))
    }

    /// Loads `explicit` when given, which must exist. Otherwise reads the
    /// default location and falls back to defaults when that file is absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
