//! State definitions and their enter/exit hooks.

use crate::core::{Hook, HookResult};

/// A named state with ordered enter and exit hooks.
///
/// Obtained from [`StateMachine::state`](crate::builder::StateMachine::state);
/// calling that again with the same name returns this same definition, so
/// hooks can be appended from different places during setup.
#[derive(Debug)]
pub struct State<E, T> {
    name: String,
    enters: Vec<Hook<E, T>>,
    exits: Vec<Hook<E, T>>,
}

impl<E, T> State<E, T> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enters: Vec::new(),
            exits: Vec::new(),
        }
    }

    /// Name the state was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a hook run after an entity has been moved into this state.
    pub fn enter<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut E, Option<&mut T>) -> HookResult + Send + Sync + 'static,
    {
        self.enters.push(Hook::new(hook));
        self
    }

    /// Append a hook run before an entity leaves this state.
    pub fn exit<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut E, Option<&mut T>) -> HookResult + Send + Sync + 'static,
    {
        self.exits.push(Hook::new(hook));
        self
    }

    pub(crate) fn enters(&self) -> &[Hook<E, T>] {
        &self.enters
    }

    pub(crate) fn exits(&self) -> &[Hook<E, T>] {
        &self.exits
    }
}
