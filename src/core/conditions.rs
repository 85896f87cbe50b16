//! Condition channels and the condition map.
//!
//! A channel is a named, fixed-length vector of numeric slots. Lengths are
//! fixed when the channel is declared and never change afterwards.

use crate::error::StateMachineError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Current value of every declared condition channel.
///
/// Channels keep their declaration order, which is also the order in which
/// history trackers scan them.
///
/// # Example
///
/// ```rust
/// use showstate::core::ConditionMap;
///
/// let mut conditions = ConditionMap::new();
/// conditions.declare("/retrieval", 2);
///
/// conditions.set("/retrieval", 0, 1.0).unwrap();
/// assert_eq!(conditions.get("/retrieval"), Some(&[1.0, 0.0][..]));
/// assert!(conditions.set("/retrieval", 2, 1.0).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionMap {
    channels: IndexMap<String, Vec<f64>>,
}

impl ConditionMap {
    /// Create an empty map with no declared channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a channel of `len` slots, all zero.
    ///
    /// Returns `false` (and leaves the map untouched) if the channel was
    /// already declared.
    pub fn declare(&mut self, key: impl Into<String>, len: usize) -> bool {
        let key = key.into();
        if self.channels.contains_key(&key) {
            return false;
        }
        self.channels.insert(key, vec![0.0; len]);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.channels.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.channels.get(key).map(Vec::as_slice)
    }

    /// Value of a single slot, if both channel and index exist.
    pub fn value(&self, key: &str, index: usize) -> Option<f64> {
        self.channels.get(key).and_then(|slots| slots.get(index)).copied()
    }

    /// Validate a write without touching the map.
    ///
    /// Non-finite values are rejected: they never compare equal, so a
    /// history would see them change on every update.
    pub fn check(&self, key: &str, index: usize, value: f64) -> Result<(), StateMachineError> {
        let slots = self
            .channels
            .get(key)
            .ok_or_else(|| StateMachineError::UnknownChannel {
                channel: key.to_string(),
            })?;

        if index >= slots.len() {
            return Err(StateMachineError::IndexOutOfRange {
                channel: key.to_string(),
                index,
                len: slots.len(),
            });
        }
        if !value.is_finite() {
            return Err(StateMachineError::NonFiniteValue {
                channel: key.to_string(),
                value,
            });
        }
        Ok(())
    }

    /// Write one slot, returning the value it replaced.
    pub fn set(&mut self, key: &str, index: usize, value: f64) -> Result<f64, StateMachineError> {
        self.check(key, index, value)?;
        let slot = &mut self.channels[key][index];
        Ok(std::mem::replace(slot, value))
    }

    pub(crate) fn slot_mut(&mut self, key: &str, index: usize) -> Option<&mut f64> {
        self.channels.get_mut(key).and_then(|slots| slots.get_mut(index))
    }

    /// Reset every slot to zero, keeping declared lengths.
    pub fn clear(&mut self) {
        for slots in self.channels.values_mut() {
            slots.iter_mut().for_each(|slot| *slot = 0.0);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.channels
            .iter()
            .map(|(key, slots)| (key.as_str(), slots.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
