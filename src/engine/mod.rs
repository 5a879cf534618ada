//! The trigger engine: performing events on entities.
//!
//! `StateMachine::trigger` resolves the one transition of an event that
//! accepts the entity's current state, runs the state and transition hooks
//! around the state change, and appends a change-log record when a
//! transactional scope is supplied.
//!
//! # Rollback
//!
//! | failing step | entity state afterwards |
//! | --- | --- |
//! | resolution, exit or before hooks | unchanged |
//! | enter or after hooks | restored to the pre-transition state |
//! | change-log append | target state (the transition stands) |
//!
//! The engine never starts, commits or rolls back the scope itself, and
//! never retries hooks.

mod error;
mod trigger;

pub use error::TransitionError;
