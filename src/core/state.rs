//! States of a configured machine.
//!
//! A state owns its entry and exit actions and a condition history scoped
//! to its own activations. It never talks to an output directly: `begin`
//! and `update` write [`Emission`]s into a buffer supplied by the machine.

use super::action::ActionMessage;
use super::conditions::ConditionMap;
use super::history::ConditionHistory;
use super::resolver::{TransitionResolver, Trigger};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Output produced by a state, addressed to one of the two logical sinks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Emission {
    /// An entry or exit action, for the "actions" sink
    Action(ActionMessage),
    /// The name of a state that just began, for the "state announcements" sink
    Announce(String),
}

/// A named state with entry/exit actions and its own condition history.
///
/// # Example
///
/// ```rust
/// use showstate::core::{ActionMessage, ConditionMap, Emission, State};
///
/// let mut state = State::new("idle", vec![ActionMessage::parse("/video 1 1")]);
/// let mut out = Vec::new();
///
/// let next = state.begin(&ConditionMap::new(), None, &mut out);
/// assert!(next.is_none());
/// assert_eq!(out[0], Emission::Announce("idle".to_string()));
/// assert_eq!(out[1], Emission::Action(ActionMessage::parse("/video 1 1")));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct State {
    name: String,
    entry: Vec<ActionMessage>,
    exit: Vec<ActionMessage>,
    history: ConditionHistory,
}

impl State {
    pub fn new(name: impl Into<String>, entry: Vec<ActionMessage>) -> Self {
        Self {
            name: name.into(),
            entry,
            exit: Vec::new(),
            history: ConditionHistory::new(),
        }
    }

    /// Restrict the state's history to the given channels.
    pub fn with_history(mut self, history: ConditionHistory) -> Self {
        self.history = history;
        self
    }

    pub(crate) fn set_exit_actions(&mut self, exit: Vec<ActionMessage>) {
        self.exit = exit;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_actions(&self) -> &[ActionMessage] {
        &self.entry
    }

    pub fn exit_actions(&self) -> &[ActionMessage] {
        &self.exit
    }

    pub fn history(&self) -> &ConditionHistory {
        &self.history
    }

    pub(crate) fn replace_history(&mut self, history: ConditionHistory) {
        self.history = history;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Activate the state.
    ///
    /// Announces the state, emits its entry actions, records the current
    /// conditions as this activation's baseline and gives the resolver one
    /// chance to leave immediately.
    pub fn begin(
        &mut self,
        conditions: &ConditionMap,
        resolver: Option<&dyn TransitionResolver>,
        out: &mut Vec<Emission>,
    ) -> Option<String> {
        debug!(state = %self.name, "begin state");
        out.push(Emission::Announce(self.name.clone()));
        out.extend(self.entry.iter().cloned().map(Emission::Action));

        self.history.update(conditions);
        self.decide(Trigger::Entered, conditions, resolver, out)
    }

    /// Observe the current conditions and ask the resolver for a destination.
    ///
    /// Exit actions are emitted when a destination is returned.
    pub fn update(
        &mut self,
        conditions: &ConditionMap,
        resolver: Option<&dyn TransitionResolver>,
        out: &mut Vec<Emission>,
    ) -> Option<String> {
        self.history.update(conditions);
        let trigger = Trigger::from(self.history.latest_change());
        trace!(state = %self.name, ?trigger, "update state");
        self.decide(trigger, conditions, resolver, out)
    }

    fn decide(
        &self,
        trigger: Trigger,
        conditions: &ConditionMap,
        resolver: Option<&dyn TransitionResolver>,
        out: &mut Vec<Emission>,
    ) -> Option<String> {
        let Some(resolver) = resolver else {
            trace!(state = %self.name, "no resolver registered");
            return None;
        };

        let destination = resolver.resolve(&trigger, conditions)?;
        debug!(state = %self.name, destination = %destination, "resolver chose destination");
        out.extend(self.exit.iter().cloned().map(Emission::Action));
        Some(destination)
    }
}
