//! Fluent definition API for state machines.
//!
//! A machine is described by registering states (with enter/exit hooks),
//! events (with guarded transitions and before/after hooks) and an initial
//! state. Registration is additive: asking for a state or event that already
//! exists returns it, so hooks can be attached from several places during
//! setup.
//!
//! ```
//! use transition::builder::StateMachine;
//!
//! let mut machine: StateMachine<String, ()> = StateMachine::new();
//! machine.initial("draft");
//! machine
//!     .state("checkout")
//!     .enter(|_order: &mut String, _tx: Option<&mut ()>| Ok(()));
//! machine.on("checkout", "checkout").from(["draft"]);
//! machine.on("cancel", "cancelled").from(["draft", "checkout"]);
//!
//! assert!(machine.validate().is_success());
//! ```

pub mod event;
pub mod machine;
pub mod macros;
pub mod state;
pub mod validation;

pub use event::{Event, EventTransition};
pub use machine::StateMachine;
pub use state::State;
pub use validation::DefinitionIssue;
