//! Building machine definitions from the states and conditions tables.
//!
//! Validation collects every problem in both tables before failing, so a
//! broken configuration is reported in one pass.

use super::error::{ConfigError, ConfigProblem};
use super::settings::Settings;
use super::table::Table;
use crate::core::{ActionMessage, ConditionMap, State};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::info;

type Checked<T> = Validation<T, NonEmptyVec<ConfigProblem>>;

/// A validated set of states and condition channels, ready to be loaded
/// into a [`StateMachine`](crate::machine::StateMachine).
///
/// # Example
///
/// ```rust
/// use showstate::config::{MachineDefinition, Table};
///
/// let states = Table::parse("idle,/video 1 1\nfin,/video -1\n").unwrap();
/// let conditions = Table::parse("/retrieval,2\n/video,1\n").unwrap();
///
/// let definition = MachineDefinition::from_tables(&states, &conditions).unwrap();
/// assert_eq!(definition.initial_state().name(), "idle");
/// assert_eq!(definition.conditions().get("/retrieval"), Some(&[0.0, 0.0][..]));
/// ```
#[derive(Clone, Debug)]
pub struct MachineDefinition {
    states: IndexMap<String, State>,
    conditions: ConditionMap,
}

impl MachineDefinition {
    /// Validate both tables and build the definition.
    ///
    /// States table rows are `[name, action, action, ...]`: the first row
    /// naming a state supplies its entry actions, a second row its exit
    /// actions. Conditions table rows are `[channel, length]`, read up to
    /// the first row without a channel key.
    pub fn from_tables(states: &Table, conditions: &Table) -> Result<Self, Vec<ConfigProblem>> {
        match (check_states(states), check_conditions(conditions)) {
            (Validation::Success(states), Validation::Success(conditions)) => {
                Ok(Self { states, conditions })
            }
            (states, conditions) => {
                let mut problems = Vec::new();
                if let Validation::Failure(errors) = states {
                    problems.extend(errors.iter().cloned());
                }
                if let Validation::Failure(errors) = conditions {
                    problems.extend(errors.iter().cloned());
                }
                Err(problems)
            }
        }
    }

    /// Load the states and conditions files named in `settings` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>, settings: &Settings) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        info!("Creating state machine from {}", dir.display());

        let states = Table::from_path(dir.join(&settings.states_file))?;
        let conditions = Table::from_path(dir.join(&settings.conditions_file))?;
        let definition =
            Self::from_tables(&states, &conditions).map_err(ConfigError::Malformed)?;

        info!(
            "Loaded {} states and {} conditions",
            definition.states.len(),
            definition.conditions.len()
        );
        Ok(definition)
    }

    /// The state activated by `init`: the first one in the states table.
    pub fn initial_state(&self) -> &State {
        // from_tables rejects an empty states table
        &self.states[0]
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    pub fn conditions(&self) -> &ConditionMap {
        &self.conditions
    }

    pub(crate) fn into_parts(self) -> (IndexMap<String, State>, ConditionMap) {
        (self.states, self.conditions)
    }
}

fn check_states(table: &Table) -> Checked<IndexMap<String, State>> {
    let mut states: IndexMap<String, State> = IndexMap::new();
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut checks: Vec<Checked<()>> = Vec::new();

    for (i, row) in table.rows().iter().enumerate() {
        let Some((name, cells)) = row.split_first() else {
            continue;
        };
        let name = name.trim();
        let actions: Vec<ActionMessage> = cells
            .iter()
            .filter(|cell| !cell.trim().is_empty())
            .map(|cell| ActionMessage::parse(cell))
            .collect();

        if name.is_empty() {
            if !actions.is_empty() {
                checks.push(Validation::fail(ConfigProblem::MissingStateName { row: i + 1 }));
            }
            continue;
        }

        let seen = occurrences.entry(name.to_string()).or_insert(0);
        *seen += 1;
        match *seen {
            1 => {
                states.insert(name.to_string(), State::new(name, actions));
            }
            2 => {
                if let Some(state) = states.get_mut(name) {
                    state.set_exit_actions(actions);
                }
            }
            _ => checks.push(Validation::fail(ConfigProblem::RepeatedState {
                name: name.to_string(),
                row: i + 1,
            })),
        }
    }

    if states.is_empty() {
        checks.push(Validation::fail(ConfigProblem::NoStates));
    }

    Validation::all_vec(checks).map(move |_| states)
}

fn check_conditions(table: &Table) -> Checked<ConditionMap> {
    let mut conditions = ConditionMap::new();
    let mut checks: Vec<Checked<()>> = Vec::new();

    for (i, row) in table.rows().iter().enumerate() {
        let key = row.first().map_or("", |cell| cell.trim());
        if key.is_empty() {
            break;
        }

        let raw = row.get(1).map_or("", |cell| cell.trim());
        let check = match raw.parse::<usize>() {
            Ok(len) if len > 0 => {
                if conditions.declare(key, len) {
                    Validation::success(())
                } else {
                    Validation::fail(ConfigProblem::DuplicateChannel {
                        channel: key.to_string(),
                        row: i + 1,
                    })
                }
            }
            _ => Validation::fail(ConfigProblem::InvalidLength {
                channel: key.to_string(),
                raw: raw.to_string(),
                row: i + 1,
            }),
        };
        checks.push(check);
    }

    Validation::all_vec(checks).map(move |_| conditions)
}
