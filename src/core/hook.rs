//! Lifecycle hooks run while an event is being performed.

use std::fmt;

/// Boxed error returned by hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by hooks.
pub type HookResult = Result<(), BoxError>;

/// Phase of a transition in which a hook runs.
///
/// Phases run in declaration order: `Exit`, `Before`, state mutation,
/// `Enter`, `After`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// Exit hooks of the state being left.
    Exit,
    /// Before hooks of the matched transition.
    Before,
    /// Enter hooks of the target state.
    Enter,
    /// After hooks of the matched transition.
    After,
}

impl HookPhase {
    /// Whether a failure in this phase must restore the pre-transition state.
    ///
    /// Exit and before hooks run before the state is mutated, so there is
    /// nothing to restore.
    pub fn rolls_back(self) -> bool {
        matches!(self, Self::Enter | Self::After)
    }

    /// Lowercase name of the phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Before => "before",
            Self::Enter => "enter",
            Self::After => "after",
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single side-effecting callback attached to a state or transition.
///
/// A hook receives the entity and the transactional scope of the current
/// trigger (if one was supplied). Returning an error aborts the transition.
///
/// # Example
///
/// ```rust
/// use transition::core::Hook;
///
/// let mut calls = 0;
/// let hook: Hook<u32, ()> = Hook::new(|count: &mut u32, _scope: Option<&mut ()>| {
///     *count += 1;
///     Ok(())
/// });
///
/// hook.call(&mut calls, None).unwrap();
/// assert_eq!(calls, 1);
/// ```
pub struct Hook<E, T> {
    callback: Box<dyn Fn(&mut E, Option<&mut T>) -> HookResult + Send + Sync>,
}

impl<E, T> Hook<E, T> {
    /// Wrap a callback as a hook. The callback must be thread-safe so a
    /// finished machine can be shared across threads.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut E, Option<&mut T>) -> HookResult + Send + Sync + 'static,
    {
        Hook {
            callback: Box::new(callback),
        }
    }

    /// Invoke the hook.
    pub fn call(&self, entity: &mut E, scope: Option<&mut T>) -> HookResult {
        (self.callback)(entity, scope)
    }
}

impl<E, T> fmt::Debug for Hook<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook")
    }
}
