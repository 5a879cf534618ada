//! Events and the guarded transitions they own.

use crate::core::{Hook, HookResult};

/// A named event owning an ordered list of guarded transitions.
#[derive(Debug)]
pub struct Event<E, T> {
    name: String,
    transitions: Vec<EventTransition<E, T>>,
}

impl<E, T> Event<E, T> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: Vec::new(),
        }
    }

    /// Name the event was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a transition into `state` and return it for further setup.
    pub fn to(&mut self, state: impl Into<String>) -> &mut EventTransition<E, T> {
        self.transitions.push(EventTransition::new(state));
        let last = self.transitions.len() - 1;
        &mut self.transitions[last]
    }

    /// All transitions of this event, in registration order.
    pub fn transitions(&self) -> &[EventTransition<E, T>] {
        &self.transitions
    }

    /// Transitions whose guard accepts `state`, in registration order.
    pub fn candidates(&self, state: &str) -> Vec<&EventTransition<E, T>> {
        self.transitions
            .iter()
            .filter(|transition| transition.accepts(state))
            .collect()
    }
}

/// One edge of an event: a set of source states, a target state, and the
/// before/after hooks run around the state change.
#[derive(Debug)]
pub struct EventTransition<E, T> {
    to: String,
    froms: Vec<String>,
    befores: Vec<Hook<E, T>>,
    afters: Vec<Hook<E, T>>,
}

impl<E, T> EventTransition<E, T> {
    fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            froms: Vec::new(),
            befores: Vec::new(),
            afters: Vec::new(),
        }
    }

    /// Set the source states this transition accepts, replacing any earlier
    /// set. Leaving it empty accepts every state.
    pub fn from<I, S>(&mut self, states: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.froms = states.into_iter().map(Into::into).collect();
        self
    }

    /// Append a hook run before the entity's state is changed.
    pub fn before<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut E, Option<&mut T>) -> HookResult + Send + Sync + 'static,
    {
        self.befores.push(Hook::new(hook));
        self
    }

    /// Append a hook run after the target state has been entered.
    pub fn after<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut E, Option<&mut T>) -> HookResult + Send + Sync + 'static,
    {
        self.afters.push(Hook::new(hook));
        self
    }

    /// Target state entered when this transition fires.
    pub fn to_state(&self) -> &str {
        &self.to
    }

    /// Accepted source states. Empty means any state.
    pub fn froms(&self) -> &[String] {
        &self.froms
    }

    /// Whether the guard admits `state` as a source.
    pub fn accepts(&self, state: &str) -> bool {
        self.froms.is_empty() || self.froms.iter().any(|from| from == state)
    }

    pub(crate) fn befores(&self) -> &[Hook<E, T>] {
        &self.befores
    }

    pub(crate) fn afters(&self) -> &[Hook<E, T>] {
        &self.afters
    }
}
