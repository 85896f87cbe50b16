//! The state machine: registry, condition map and event dispatch.
//!
//! This is the imperative shell around the pure core. It owns every state,
//! the global condition map and the output sink, and processes one event
//! at a time to completion.
//!
//! # Atomicity
//!
//! Emissions produced while handling an event (or `init`) are buffered and
//! only reach the sink once the whole transition chain succeeded. If any
//! step fails, the written condition slot, every touched state history,
//! the journal and the current state are put back as they were.

mod journal;
mod output;

pub use journal::{Transition, TransitionLog};
pub use output::{OutputSink, RecordingSink, WriterSink};

use crate::config::{ConfigError, MachineDefinition, Settings, Table, Verbosity};
use crate::core::{
    ConditionChange, ConditionHistory, ConditionMap, Emission, ResolverRegistry, State,
    TransitionResolver,
};
use crate::error::StateMachineError;
use chrono::Utc;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of handling one event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventOutcome {
    /// The active state kept control
    Stayed(String),
    /// Control moved, possibly through several states, ending in `to`
    Transitioned { from: String, to: String },
}

impl EventOutcome {
    /// The state active after the event.
    pub fn state(&self) -> &str {
        match self {
            EventOutcome::Stayed(state) => state,
            EventOutcome::Transitioned { to, .. } => to,
        }
    }

    pub fn transitioned(&self) -> bool {
        matches!(self, EventOutcome::Transitioned { .. })
    }
}

/// Everything needed to undo a failed event.
struct Undo {
    current: Option<String>,
    slot: Option<(String, usize, f64)>,
    histories: Vec<(String, ConditionHistory)>,
    journal_len: usize,
}

impl Undo {
    fn new(current: Option<String>, journal_len: usize) -> Self {
        Self {
            current,
            slot: None,
            histories: Vec::new(),
            journal_len,
        }
    }

    fn save(&mut self, states: &IndexMap<String, State>, name: &str) {
        if self.histories.iter().any(|(saved, _)| saved == name) {
            return;
        }
        if let Some(state) = states.get(name) {
            self.histories
                .push((name.to_string(), state.history().clone()));
        }
    }
}

/// Condition-driven state machine.
///
/// # Example
///
/// ```rust
/// use showstate::config::{Settings, Table};
/// use showstate::core::{ConditionMap, Trigger};
/// use showstate::machine::{RecordingSink, StateMachine};
///
/// let states = Table::parse("idle,/video 1 1\nfin,/video -1\n").unwrap();
/// let conditions = Table::parse("/video,1\n").unwrap();
///
/// let mut machine = StateMachine::new(Settings::default(), RecordingSink::new());
/// machine.load_tables(&states, &conditions).unwrap();
/// machine.register_resolver("idle", |trigger: &Trigger, _: &ConditionMap| {
///     trigger.activated("/video").map(|_| "fin".to_string())
/// });
///
/// machine.init().unwrap();
/// let outcome = machine.handle_event("/video", 0, 1.0).unwrap();
///
/// assert_eq!(outcome.state(), "fin");
/// let announced: Vec<_> = machine.sink().announcements().collect();
/// assert_eq!(announced, vec!["idle", "fin"]);
/// ```
pub struct StateMachine<O: OutputSink> {
    settings: Settings,
    states: IndexMap<String, State>,
    conditions: ConditionMap,
    resolvers: ResolverRegistry,
    current: Option<String>,
    initialized: bool,
    journal: TransitionLog,
    sink: O,
}

impl<O: OutputSink> StateMachine<O> {
    /// Create an unconfigured machine.
    pub fn new(settings: Settings, sink: O) -> Self {
        Self {
            settings,
            states: IndexMap::new(),
            conditions: ConditionMap::new(),
            resolvers: ResolverRegistry::new(),
            current: None,
            initialized: false,
            journal: TransitionLog::new(),
            sink,
        }
    }

    /// Replace the resolver registry.
    pub fn with_resolvers(mut self, resolvers: ResolverRegistry) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Register (or replace) the resolver for `state`.
    pub fn register_resolver<R>(
        &mut self,
        state: impl Into<String>,
        resolver: R,
    ) -> Option<Arc<dyn TransitionResolver>>
    where
        R: TransitionResolver + 'static,
    {
        self.resolvers.register(state, resolver)
    }

    pub fn resolvers(&self) -> &ResolverRegistry {
        &self.resolvers
    }

    pub fn resolvers_mut(&mut self) -> &mut ResolverRegistry {
        &mut self.resolvers
    }

    /// Install a validated definition, replacing any previous one.
    ///
    /// The machine returns to the uninitialized state.
    pub fn load(&mut self, definition: MachineDefinition) {
        let (states, conditions) = definition.into_parts();
        self.states = states;
        self.conditions = conditions;
        self.current = None;
        self.initialized = false;
        self.journal.clear();

        for name in self.resolvers.states() {
            if !self.states.contains_key(name) {
                warn!("Resolver registered for unknown state '{}'", name);
            }
        }
        if self.settings.logs(Verbosity::Normal) {
            info!("States: {}", self.state_names().collect::<Vec<_>>().join(", "));
            info!("Conditions: {}", self.conditions.keys().collect::<Vec<_>>().join(", "));
        }
    }

    /// Validate the two tables and load them. Nothing changes on error.
    pub fn load_tables(&mut self, states: &Table, conditions: &Table) -> Result<(), StateMachineError> {
        let definition = MachineDefinition::from_tables(states, conditions)
            .map_err(StateMachineError::MalformedConfiguration)?;
        self.load(definition);
        Ok(())
    }

    /// Load the states and conditions files from a machine directory.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<(), StateMachineError> {
        let definition =
            MachineDefinition::from_dir(dir, &self.settings).map_err(|e| match e {
                ConfigError::Malformed(problems) => {
                    StateMachineError::MalformedConfiguration(problems)
                }
                other => StateMachineError::Config(other),
            })?;
        self.load(definition);
        Ok(())
    }

    /// Activate the first state of the states table.
    pub fn init(&mut self) -> Result<(), StateMachineError> {
        let initial = self
            .states
            .keys()
            .next()
            .cloned()
            .ok_or(StateMachineError::NotConfigured)?;
        if self.initialized {
            return Err(StateMachineError::AlreadyInitialized);
        }

        let mut undo = Undo::new(self.current.clone(), self.journal.len());
        let mut out = Vec::new();
        match self.activate(initial, None, None, &mut undo, &mut out) {
            Ok(()) => {
                self.initialized = true;
                self.flush(&out);
                Ok(())
            }
            Err(e) => {
                self.rollback(undo);
                Err(e)
            }
        }
    }

    /// Zero every condition and clear every state history.
    ///
    /// The current state is kept, but events are refused until the next
    /// [`init`](Self::init).
    pub fn reset(&mut self) {
        self.conditions.clear();
        for state in self.states.values_mut() {
            state.clear_history();
        }
        self.journal.clear();
        self.initialized = false;
        info!("State machine reset");
    }

    /// Apply one inbound condition update and follow any resulting
    /// transitions. `index` is zero-based.
    pub fn handle_event(
        &mut self,
        channel: &str,
        index: usize,
        value: f64,
    ) -> Result<EventOutcome, StateMachineError> {
        if self.states.is_empty() {
            return Err(StateMachineError::NotConfigured);
        }
        let from = match (&self.current, self.initialized) {
            (Some(current), true) => current.clone(),
            _ => return Err(StateMachineError::NotInitialized),
        };
        self.conditions.check(channel, index, value)?;

        if self.settings.logs(Verbosity::Normal) {
            info!("Event in: {} [{}] = {}", channel, index, value);
        }

        let mut undo = Undo::new(Some(from.clone()), self.journal.len());
        let mut out = Vec::new();
        match self.process(channel, index, value, &from, &mut undo, &mut out) {
            Ok(()) => {
                self.flush(&out);
                let to = self.current.clone().unwrap_or_else(|| from.clone());
                if to == from && self.journal.len() == undo.journal_len {
                    Ok(EventOutcome::Stayed(to))
                } else {
                    Ok(EventOutcome::Transitioned { from, to })
                }
            }
            Err(e) => {
                warn!("Rejected event {} [{}] = {}: {}", channel, index, value, e);
                self.rollback(undo);
                Err(e)
            }
        }
    }

    fn process(
        &mut self,
        channel: &str,
        index: usize,
        value: f64,
        from: &str,
        undo: &mut Undo,
        out: &mut Vec<Emission>,
    ) -> Result<(), StateMachineError> {
        let previous = self.conditions.set(channel, index, value)?;
        undo.slot = Some((channel.to_string(), index, previous));
        if self.settings.logs(Verbosity::Verbose) {
            debug!(conditions = ?self.conditions, "conditions updated");
        }

        undo.save(&self.states, from);
        let state = self
            .states
            .get_mut(from)
            .ok_or(StateMachineError::NotInitialized)?;
        let next = state.update(&self.conditions, self.resolvers.get(from), out);
        if self.settings.logs(Verbosity::Trace) {
            debug!(state = from, history = ?state.history(), "history updated");
        }

        let Some(next) = next else {
            return Ok(());
        };
        let trigger = state.history().latest_change();
        self.check_destination(from, &next)?;
        self.activate(next, Some(from.to_string()), trigger, undo, out)
    }

    /// Begin `name`, then keep following destinations requested on entry.
    fn activate(
        &mut self,
        mut name: String,
        mut from: Option<String>,
        mut trigger: Option<ConditionChange>,
        undo: &mut Undo,
        out: &mut Vec<Emission>,
    ) -> Result<(), StateMachineError> {
        let mut chained = 0;
        loop {
            if let Some(from) = from.take() {
                if self.settings.logs(Verbosity::Normal) {
                    info!("Transition: {} -> {}", from, name);
                }
                self.journal.record(Transition {
                    from,
                    to: name.clone(),
                    trigger: trigger.take(),
                    timestamp: Utc::now(),
                });
            }
            self.current = Some(name.clone());

            undo.save(&self.states, &name);
            let state = self
                .states
                .get_mut(&name)
                .ok_or_else(|| StateMachineError::UnknownState {
                    from: name.clone(),
                    name: name.clone(),
                })?;
            let Some(next) = state.begin(&self.conditions, self.resolvers.get(&name), out) else {
                return Ok(());
            };

            self.check_destination(&name, &next)?;
            chained += 1;
            if chained > self.settings.max_chained_transitions {
                return Err(StateMachineError::TransitionLoop {
                    from: name,
                    limit: self.settings.max_chained_transitions,
                });
            }
            from = Some(std::mem::replace(&mut name, next));
        }
    }

    fn check_destination(&self, from: &str, next: &str) -> Result<(), StateMachineError> {
        if self.states.contains_key(next) {
            Ok(())
        } else {
            Err(StateMachineError::UnknownState {
                from: from.to_string(),
                name: next.to_string(),
            })
        }
    }

    fn rollback(&mut self, undo: Undo) {
        self.current = undo.current;
        if let Some((channel, index, value)) = undo.slot {
            if let Some(slot) = self.conditions.slot_mut(&channel, index) {
                *slot = value;
            }
        }
        for (name, history) in undo.histories {
            if let Some(state) = self.states.get_mut(&name) {
                state.replace_history(history);
            }
        }
        self.journal.truncate(undo.journal_len);
    }

    fn flush(&mut self, out: &[Emission]) {
        for emission in out {
            self.sink.emit(emission);
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_configured(&self) -> bool {
        !self.states.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The active state. Kept across [`reset`](Self::reset).
    pub fn current_state(&self) -> Option<&State> {
        self.current
            .as_deref()
            .and_then(|name| self.states.get(name))
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    /// State names in table order; the first one is the initial state.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn conditions(&self) -> &ConditionMap {
        &self.conditions
    }

    /// The condition map as pretty-printed JSON.
    pub fn dump_conditions(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.conditions)
    }

    pub fn journal(&self) -> &TransitionLog {
        &self.journal
    }

    pub fn sink(&self) -> &O {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut O {
        &mut self.sink
    }

    pub fn into_sink(self) -> O {
        self.sink
    }
}
