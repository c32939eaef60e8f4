use crate::calendar::{ParseViewModeError, ViewMode};
use std::path::PathBuf;
use thiserror::Error;

const DATA_DIR_VAR: &str = "SLEEPTRACK_DATA_DIR";
const EXPORT_DIR_VAR: &str = "SLEEPTRACK_EXPORT_DIR";
pub(crate) const VIEW_VAR: &str = "SLEEPTRACK_VIEW";
const LOG_VAR: &str = "SLEEPTRACK_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Config {
    /// Where the JSON store lives
    pub(crate) data_dir: PathBuf,
    /// Where CSV exports are written
    pub(crate) export_dir: PathBuf,
    pub(crate) view_mode: ViewMode,
    /// `tracing_subscriber::EnvFilter` directives
    pub(crate) log_filter: String,
}

impl Config {
    /// Reads settings through `get` instead of the process environment
    pub(crate) fn from_env_with<F>(mut get: F) -> Result<Config, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let data_dir = get(DATA_DIR_VAR)
            .filter(|s| !s.is_empty())
            .map_or_else(default_data_dir, PathBuf::from);
        let export_dir = get(EXPORT_DIR_VAR)
            .filter(|s| !s.is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let view_mode = match get(VIEW_VAR).filter(|s| !s.is_empty()) {
            Some(s) => s.parse::<ViewMode>()?,
            None => ViewMode::default(),
        };
        let log_filter = get(LOG_VAR)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());
        Ok(Config {
            data_dir,
            export_dir,
            view_mode,
            log_filter,
        })
    }

    pub(crate) fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum ConfigError {
    #[error("invalid SLEEPTRACK_VIEW value")]
    View(#[from] ParseViewModeError),
}
