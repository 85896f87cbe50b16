//! Runtime settings passed to a machine at construction.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How much detail the machine logs about its own decisions.
///
/// This is checked by the machine itself before it logs condition and
/// history dumps; it is independent of the subscriber's filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// State changes and inbound events
    #[default]
    Normal,
    /// Condition map after every event
    Verbose,
    /// Condition histories after every update
    Trace,
}

/// Machine settings.
///
/// # Example
///
/// ```rust
/// use showstate::config::{Settings, Verbosity};
///
/// let settings: Settings = serde_json::from_str(r#"{ "verbosity": "verbose" }"#).unwrap();
/// assert_eq!(settings.verbosity, Verbosity::Verbose);
/// assert_eq!(settings.states_file, "states.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub verbosity: Verbosity,
    /// Upper bound on transitions requested on entry and followed within a
    /// single event or `init`
    pub max_chained_transitions: usize,
    /// States table file name inside a machine directory
    pub states_file: String,
    /// Conditions table file name inside a machine directory
    pub conditions_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            max_chained_transitions: 16,
            states_file: "states.csv".to_string(),
            conditions_file: "conditions.csv".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Whether logging at `level` is enabled for this machine.
    pub fn logs(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }
}
