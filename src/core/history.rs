//! Condition history tracking.
//!
//! A [`ConditionHistory`] keeps, per channel, a chronological log of the
//! vectors it has seen change, and derives two things on every update:
//! which slots changed since the latest snapshot, and whether the current
//! vector is new to the channel.

use super::conditions::ConditionMap;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Copy of a channel vector recorded when at least one slot changed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Slot values at the time of the change
    pub values: Vec<f64>,
    /// When the snapshot was appended
    pub recorded_at: DateTime<Utc>,
}

/// A single flagged slot, as reported by [`ConditionHistory::latest_change`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionChange {
    /// Channel key the slot belongs to
    pub channel: String,
    /// Zero-based slot index
    pub index: usize,
    /// Current slot value
    pub value: f64,
    /// Whether the channel vector has not been seen before
    pub unique: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ChannelHistory {
    snapshots: Vec<Snapshot>,
    changed: Vec<bool>,
    unique: bool,
}

impl ChannelHistory {
    fn observe(&mut self, current: &[f64]) {
        self.changed = match self.snapshots.last() {
            None => vec![true; current.len()],
            Some(latest) => current
                .iter()
                .zip(&latest.values)
                .map(|(now, then)| now != then)
                .collect(),
        };

        if !self.changed.iter().any(|&flag| flag) {
            self.unique = false;
            return;
        }

        self.snapshots.push(Snapshot {
            values: current.to_vec(),
            recorded_at: Utc::now(),
        });

        // The snapshot just appended is excluded from the search.
        let earlier = &self.snapshots[..self.snapshots.len() - 1];
        self.unique = !earlier.iter().any(|snapshot| snapshot.values == current);
    }
}

/// Per-channel change and uniqueness tracker.
///
/// Every call to [`update`](Self::update) recomputes the change flags from
/// scratch against the most recent snapshot. A snapshot is appended if and
/// only if some slot changed.
///
/// # Example
///
/// ```rust
/// use showstate::core::{ConditionHistory, ConditionMap};
///
/// let mut conditions = ConditionMap::new();
/// conditions.declare("/retrieval", 2);
///
/// let mut history = ConditionHistory::new();
/// history.update(&conditions);
/// assert!(history.is_unique("/retrieval"));
///
/// conditions.set("/retrieval", 1, 1.0).unwrap();
/// history.update(&conditions);
///
/// let change = history.latest_change().unwrap();
/// assert_eq!(change.channel, "/retrieval");
/// assert_eq!(change.index, 1);
/// assert_eq!(change.value, 1.0);
/// assert!(change.unique);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConditionHistory {
    scope: Option<IndexSet<String>>,
    channels: IndexMap<String, ChannelHistory>,
}

impl ConditionHistory {
    /// Create a tracker that observes every channel it is given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker that ignores channels outside `keys`.
    pub fn scoped<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            scope: Some(keys.into_iter().map(Into::into).collect()),
            channels: IndexMap::new(),
        }
    }

    pub fn observes(&self, key: &str) -> bool {
        self.scope.as_ref().is_none_or(|scope| scope.contains(key))
    }

    /// Feed the current condition map into the tracker.
    ///
    /// A channel seen for the first time has every slot flagged and is
    /// always unique. An unchanged channel is never unique.
    pub fn update(&mut self, conditions: &ConditionMap) {
        for (key, current) in conditions.iter() {
            if !self.observes(key) {
                continue;
            }
            self.channels
                .entry(key.to_string())
                .or_default()
                .observe(current);
        }
    }

    /// One currently flagged slot, or `None` if nothing changed.
    ///
    /// Only a single change is reported even when several slots are flagged;
    /// callers feed one external event per update. With several flags the
    /// last one in channel order, then slot order, wins.
    pub fn latest_change(&self) -> Option<ConditionChange> {
        self.channels
            .iter()
            .flat_map(|(key, channel)| {
                channel
                    .changed
                    .iter()
                    .enumerate()
                    .filter(|(_, flag)| **flag)
                    .map(move |(index, _)| (key, channel, index))
            })
            .last()
            .and_then(|(key, channel, index)| {
                let latest = channel.snapshots.last()?;
                Some(ConditionChange {
                    channel: key.clone(),
                    index,
                    value: latest.values[index],
                    unique: channel.unique,
                })
            })
    }

    /// Change flags computed by the last update for `key`.
    pub fn changes(&self, key: &str) -> Option<&[bool]> {
        self.channels.get(key).map(|channel| channel.changed.as_slice())
    }

    pub fn is_unique(&self, key: &str) -> bool {
        self.channels.get(key).is_some_and(|channel| channel.unique)
    }

    /// All snapshots recorded for `key`, oldest first.
    pub fn snapshots(&self, key: &str) -> &[Snapshot] {
        self.channels
            .get(key)
            .map(|channel| channel.snapshots.as_slice())
            .unwrap_or_default()
    }

    /// Channels observed so far, in first-seen order.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Forget every snapshot and flag. The scope is kept.
    pub fn clear(&mut self) {
        self.channels.clear();
    }
}
