//! Transition: an embeddable state machine engine for business entities
//!
//! A [`StateMachine`] describes the lifecycle of an entity type (an order, an
//! invoice, a ticket) as named states reached through named events. Events
//! own guarded transitions; states and transitions carry hooks that run in a
//! fixed order and can veto the change. Every successful transition performed
//! inside a transactional scope leaves an immutable [`StateChangeLog`] record
//! behind.
//!
//! # Core Concepts
//!
//! - **Entity adapter**: entities implement [`Stater`] and [`Referable`]
//! - **Definition**: states, events and transitions, built once and shared
//! - **Trigger**: `StateMachine::trigger` performs an event on one entity
//! - **Change log**: records are appended through a [`ChangeLogScope`] and
//!   read back through a [`ChangeLogStore`]
//!
//! # Example
//!
//! ```rust
//! use transition::changelog::{last_state_change, MemoryChangeLog, MemoryTransaction};
//! use transition::core::{reference_key, Referable, ReferenceKeyError};
//! use transition::{impl_stater, StateMachine};
//!
//! #[derive(Default)]
//! struct Order {
//!     id: u64,
//!     state: String,
//! }
//!
//! impl_stater!(Order, state);
//!
//! impl Referable for Order {
//!     fn table_name(&self) -> Result<String, ReferenceKeyError> {
//!         Ok("orders".to_string())
//!     }
//!
//!     fn reference_key(&self) -> Result<String, ReferenceKeyError> {
//!         reference_key(&[&self.id])
//!     }
//! }
//!
//! let mut machine: StateMachine<Order, MemoryTransaction> = StateMachine::new();
//! machine.initial("draft");
//! machine.on("checkout", "checkout").from(["draft"]);
//! machine.on("pay", "paid").from(["checkout"]);
//!
//! let log = MemoryChangeLog::new();
//! let mut order = Order { id: 1, ..Order::default() };
//!
//! let mut tx = log.begin();
//! machine.trigger("checkout", &mut order, Some(&mut tx), &[]).unwrap();
//! machine.trigger("pay", &mut order, Some(&mut tx), &["pay note"]).unwrap();
//! tx.commit();
//!
//! assert_eq!(order.state, "paid");
//! let last = last_state_change(&order, &log).unwrap().unwrap();
//! assert_eq!((last.from.as_str(), last.to.as_str()), ("checkout", "paid"));
//! ```

pub mod builder;
pub mod changelog;
pub mod core;
pub mod engine;

// Re-export commonly used types
pub use builder::StateMachine;
pub use changelog::{ChangeLogScope, ChangeLogStore, StateChangeLog};
pub use self::core::{Referable, Stater};
pub use engine::TransitionError;
