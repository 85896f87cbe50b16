//! Journal of state switches.

use crate::core::ConditionChange;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state switch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transition {
    /// The state being left
    pub from: String,
    /// The state being entered
    pub to: String,
    /// The change that triggered the switch; `None` for a switch requested
    /// right after entering `from`
    pub trigger: Option<ConditionChange>,
    /// When the switch happened
    pub timestamp: DateTime<Utc>,
}

/// Ordered journal of state switches since the last init.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionLog {
    transitions: Vec<Transition>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// States traversed in order: the first `from`, then every `to`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        path.extend(self.transitions.iter().map(|t| t.to.as_str()));
        path
    }

    /// Time between the first and last recorded switch.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.transitions.truncate(len);
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
