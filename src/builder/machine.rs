//! The state machine definition: states, events and the initial state.

use crate::builder::event::{Event, EventTransition};
use crate::builder::state::State;
use std::collections::BTreeMap;

/// Definition of a state machine for entities of type `E`, whose hooks and
/// change-log writes run against a transactional scope of type `T`.
///
/// A machine is built once with the fluent definition methods and then only
/// read while triggering. It is `Send + Sync`, so it can be shared behind an
/// `Arc` by every thread that drives entities through it.
///
/// # Example
///
/// ```rust
/// use transition::builder::StateMachine;
/// use transition::changelog::MemoryTransaction;
///
/// #[derive(Default)]
/// struct Order {
///     id: u64,
///     state: String,
/// }
///
/// let mut machine: StateMachine<Order, MemoryTransaction> = StateMachine::new();
/// machine.initial("draft");
/// machine.state("checkout");
/// machine.state("paid");
/// machine.event("checkout").to("checkout").from(["draft"]);
/// machine.on("pay", "paid").from(["checkout"]);
///
/// assert_eq!(machine.initial_state(), "draft");
/// assert_eq!(machine.event_names(), vec!["checkout", "pay"]);
/// ```
#[derive(Debug)]
pub struct StateMachine<E, T> {
    initial: String,
    states: BTreeMap<String, State<E, T>>,
    events: BTreeMap<String, Event<E, T>>,
}

impl<E, T> StateMachine<E, T> {
    /// Create an empty machine with no initial state.
    pub fn new() -> Self {
        Self {
            initial: String::new(),
            states: BTreeMap::new(),
            events: BTreeMap::new(),
        }
    }

    /// Set the state entities start in. Later calls overwrite earlier ones.
    pub fn initial(&mut self, name: impl Into<String>) -> &mut Self {
        self.initial = name.into();
        self
    }

    /// Register a state, or return the one already registered under `name`.
    pub fn state(&mut self, name: impl Into<String>) -> &mut State<E, T> {
        let name = name.into();
        self.states
            .entry(name.clone())
            .or_insert_with(|| State::new(name))
    }

    /// Register an event, or return the one already registered under `name`.
    pub fn event(&mut self, name: impl Into<String>) -> &mut Event<E, T> {
        let name = name.into();
        self.events
            .entry(name.clone())
            .or_insert_with(|| Event::new(name))
    }

    /// Append a transition into `to` on `event`, registering the event if
    /// needed. Shorthand for `machine.event(event).to(to)`.
    pub fn on(
        &mut self,
        event: impl Into<String>,
        to: impl Into<String>,
    ) -> &mut EventTransition<E, T> {
        self.event(event).to(to)
    }

    /// Name of the initial state, empty if never set.
    pub fn initial_state(&self) -> &str {
        &self.initial
    }

    /// Look up a registered state by name.
    pub fn get_state(&self, name: &str) -> Option<&State<E, T>> {
        self.states.get(name)
    }

    /// Look up a registered event by name.
    pub fn get_event(&self, name: &str) -> Option<&Event<E, T>> {
        self.events.get(name)
    }

    /// Names of explicitly registered states, sorted.
    pub fn state_names(&self) -> Vec<&str> {
        self.states.keys().map(String::as_str).collect()
    }

    /// Names of registered events, sorted.
    pub fn event_names(&self) -> Vec<&str> {
        self.events.keys().map(String::as_str).collect()
    }

    pub(crate) fn events(&self) -> impl Iterator<Item = &Event<E, T>> {
        self.events.values()
    }
}

impl<E, T> Default for StateMachine<E, T> {
    fn default() -> Self {
        Self::new()
    }
}
