//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// A single problem found while validating configuration tables.
///
/// Rows are numbered from 1, as they appear in the CSV file.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigProblem {
    #[error("condition '{channel}' declared more than once (row {row})")]
    DuplicateChannel { channel: String, row: usize },

    #[error("condition '{channel}' has invalid length '{raw}' (row {row})")]
    InvalidLength {
        channel: String,
        raw: String,
        row: usize,
    },

    #[error("states row {row} has actions but no state name")]
    MissingStateName { row: usize },

    #[error("state '{name}' appears more than twice (row {row})")]
    RepeatedState { name: String, row: usize },

    #[error("states table defines no states")]
    NoStates,
}

/// Errors that can occur while loading configuration from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a configuration file failed
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV table could not be parsed
    #[error("Failed to parse CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The settings file is not valid JSON for [`Settings`](super::Settings)
    #[error("Invalid settings file {}: {source}", .path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The tables parsed but describe an invalid machine
    #[error("Malformed configuration: {}", crate::error::describe_problems(.0))]
    Malformed(Vec<ConfigProblem>),
}
