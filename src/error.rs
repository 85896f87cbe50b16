//! Error types for the state machine engine.

use crate::config::{ConfigError, ConfigProblem};
use thiserror::Error;

/// Errors reported by [`StateMachine`](crate::machine::StateMachine) operations.
#[derive(Debug, Error)]
pub enum StateMachineError {
    #[error("No configuration loaded. Load states and conditions before init()")]
    NotConfigured,

    #[error("State machine already initialized. Call reset() before init() again")]
    AlreadyInitialized,

    #[error("State machine not initialized. Call init() first")]
    NotInitialized,

    #[error("Unknown condition channel '{channel}'")]
    UnknownChannel { channel: String },

    #[error("Invalid index {index} for channel '{channel}' (length {len})")]
    IndexOutOfRange {
        channel: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid value {value} for channel '{channel}'. Values must be finite")]
    NonFiniteValue { channel: String, value: f64 },

    #[error("Resolver for state '{from}' returned unknown state '{name}'")]
    UnknownState { from: String, name: String },

    #[error("More than {limit} chained transitions starting from state '{from}'")]
    TransitionLoop { from: String, limit: usize },

    #[error("Malformed configuration: {}", describe_problems(.0))]
    MalformedConfiguration(Vec<ConfigProblem>),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) fn describe_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
