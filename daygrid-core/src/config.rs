//! Global daygrid configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{DaygridError, DaygridResult};

static DEFAULT_EVENTS_DIR: &str = "~/calendar";

/// Column counts the day view supports.
const LEGAL_COLUMNS: [usize; 3] = [1, 3, 5];

fn default_events_dir() -> PathBuf {
    PathBuf::from(DEFAULT_EVENTS_DIR)
}

fn default_columns() -> usize {
    1
}

fn default_window_rows() -> u16 {
    10
}

/// Global configuration at ~/.config/daygrid/config.toml
#[derive(Deserialize, Clone)]
pub struct GlobalConfig {
    /// Directory holding .ics event files
    #[serde(default = "default_events_dir")]
    pub events_dir: PathBuf,

    /// IANA timezone for display; falls back to system detection when unset
    pub timezone: Option<String>,

    /// Side-by-side day columns: 1, 3 or 5
    #[serde(default = "default_columns")]
    pub columns: usize,

    /// Rows available for the day list
    #[serde(default = "default_window_rows")]
    pub window_rows: u16,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            events_dir: default_events_dir(),
            timezone: None,
            columns: default_columns(),
            window_rows: default_window_rows(),
        }
    }
}

impl GlobalConfig {
    pub fn config_path() -> DaygridResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DaygridError::Config("Could not determine config directory".into()))?
            .join("daygrid");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, or defaults when it doesn't exist.
    pub fn load() -> DaygridResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| DaygridError::Config(format!("Invalid {}: {}", path.display(), e)))
    }

    /// Events directory with `~` expanded.
    pub fn events_path(&self) -> PathBuf {
        let raw = self.events_dir.to_string_lossy();
        PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
    }

    /// View geometry with the column count snapped to a legal value.
    pub fn view(&self) -> ViewConfig {
        let columns = LEGAL_COLUMNS
            .into_iter()
            .min_by_key(|&legal| legal.abs_diff(self.columns))
            .unwrap_or(1);

        ViewConfig {
            columns,
            window_rows: self.window_rows.max(1),
        }
    }
}

/// Geometry the navigation state machine needs from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    pub columns: usize,
    pub window_rows: u16,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            columns: 1,
            window_rows: 10,
        }
    }
}
