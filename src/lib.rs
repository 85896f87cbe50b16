//! Showstate: a condition-driven state machine for show control
//!
//! Showstate sequences an installation through named states. Each state
//! emits entry actions when it begins and exit actions when it hands over,
//! and watches a global map of numeric condition channels. Whenever an
//! inbound event changes a channel, the active state's resolver is asked
//! whether control should move elsewhere.
//!
//! # Core Concepts
//!
//! - **Conditions**: Named, fixed-length numeric vectors updated by events
//! - **History**: Per-state snapshots that pinpoint what just changed
//! - **Resolvers**: Pure functions choosing the next state from a change
//! - **Machine**: The registry, event dispatch and output sink
//!
//! # Example
//!
//! ```rust
//! use showstate::config::{Settings, Table};
//! use showstate::installation;
//! use showstate::machine::{RecordingSink, StateMachine};
//!
//! let states = Table::parse(
//!     "idle,/video 1 1\nretrieval1,/video 2\nretrieval2,/video 3\nexit,/video 4\nfin,/video -1\n",
//! )
//! .unwrap();
//! let conditions = Table::parse("/retrieval,2\n/video/object,2\n/video,1\n").unwrap();
//!
//! let mut machine = StateMachine::new(Settings::default(), RecordingSink::new())
//!     .with_resolvers(installation::retrieval::resolvers());
//! machine.load_tables(&states, &conditions).unwrap();
//! machine.init().unwrap();
//!
//! machine.handle_event("/retrieval", 0, 1.0).unwrap();
//! assert_eq!(machine.current_state_name(), Some("retrieval1"));
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod installation;
pub mod machine;
pub mod protocol;

// Re-export commonly used types
pub use config::{MachineDefinition, Settings, Table};
pub use core::{ActionMessage, ConditionMap, State, TransitionResolver, Trigger};
pub use error::StateMachineError;
pub use machine::{EventOutcome, OutputSink, RecordingSink, StateMachine};
