use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::scanner::classify::LiveSetThreshold;
use crate::scanner::normalize::NameStyle;
use crate::scanner::ClassifierConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Live set threshold must be a positive number of seconds, got {0}")]
    InvalidThreshold(f64),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Application configuration loaded from TOML config file.
/// All fields have defaults; the config file is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Recordings at least this long are live sets.
    pub live_set_threshold_seconds: f64,
    /// Longest all-caps word kept verbatim by the name normalizer. 0 disables.
    pub max_acronym_len: usize,
    /// Number of parallel workers. 0 = auto-detect (cores / 2, min 1).
    pub workers: usize,
    /// ffprobe binary, bare name or full path.
    pub ffprobe_path: PathBuf,
    /// Per-file ffprobe timeout.
    pub probe_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            live_set_threshold_seconds: LiveSetThreshold::DEFAULT_SECONDS,
            max_acronym_len: NameStyle::default().max_acronym_len,
            workers: 0,
            ffprobe_path: PathBuf::from("ffprobe"),
            probe_timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/mvmeta/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be read or parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("{}. Using defaults.", e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<AppConfig>(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve worker count: 0 → auto-detect (cores / 2, min 1).
    pub fn resolve_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            (cores / 2).max(1)
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }

    /// Engine settings, with an optional threshold override (seconds) from the CLI.
    /// A non-positive threshold from either source is rejected.
    pub fn classifier_config(&self, threshold_override: Option<f64>) -> Result<ClassifierConfig, ConfigError> {
        let seconds = threshold_override.unwrap_or(self.live_set_threshold_seconds);
        Ok(ClassifierConfig {
            live_set_threshold: LiveSetThreshold::new(seconds)?,
            name_style: NameStyle {
                max_acronym_len: self.max_acronym_len,
            },
        })
    }

    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
