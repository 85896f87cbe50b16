//! Core state machine types and logic.
//!
//! This module contains the functional core of the machine:
//! - Condition channels via [`ConditionMap`]
//! - Per-state change detection via [`ConditionHistory`]
//! - States with entry and exit actions via [`State`]
//! - Transition decisions via [`TransitionResolver`]
//!
//! Nothing in here performs I/O. Emissions are collected into buffers and
//! handed to an output sink by the machine.

mod action;
mod conditions;
mod history;
mod resolver;
mod state;

pub use action::{ActionMessage, Token};
pub use conditions::ConditionMap;
pub use history::{ConditionChange, ConditionHistory, Snapshot};
pub use resolver::{ResolverRegistry, TransitionResolver, Trigger};
pub use state::{Emission, State};
