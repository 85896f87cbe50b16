//! Machine configuration.
//!
//! A machine directory holds two headerless CSV tables:
//!
//! - `states.csv`: `name, action, action, ...` per row. The first row for a
//!   name gives its entry actions, an optional second row its exit actions.
//! - `conditions.csv`: `channel, length` per row.
//!
//! Runtime [`Settings`] are separate and optional.

pub mod error;
pub mod loader;
pub mod settings;
pub mod table;

pub use error::{ConfigError, ConfigProblem};
pub use loader::MachineDefinition;
pub use settings::{Settings, Verbosity};
pub use table::Table;
