//! Errors returned by `trigger`.

use crate::changelog::StoreError;
use crate::core::{BoxError, HookPhase, ReferenceKeyError};
use thiserror::Error;

/// Errors that can occur while performing an event.
///
/// `UnknownEvent`, `NoMatchingTransition` and `AmbiguousTransition` render the
/// same message; they stay separate variants for diagnostics.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("failed to perform event {event} from state {state}")]
    UnknownEvent { event: String, state: String },

    #[error("failed to perform event {event} from state {state}")]
    NoMatchingTransition { event: String, state: String },

    #[error("failed to perform event {event} from state {state}")]
    AmbiguousTransition {
        event: String,
        state: String,
        candidates: usize,
    },

    /// A hook returned an error. Enter and after failures have already
    /// restored the entity's previous state.
    #[error("{phase} hook of event {event} failed: {source}")]
    Hook {
        event: String,
        phase: HookPhase,
        #[source]
        source: BoxError,
    },

    /// The transition was applied but its change-log record was not written.
    #[error("event {event} moved {from} -> {to} but the change log was not written: {source}")]
    LogPersist {
        event: String,
        from: String,
        to: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    ReferenceKey(#[from] ReferenceKeyError),
}

impl TransitionError {
    /// Whether the event could not be performed from the entity's state at
    /// all (unknown event, no match, or an ambiguous match).
    pub fn is_unperformable(&self) -> bool {
        matches!(
            self,
            Self::UnknownEvent { .. }
                | Self::NoMatchingTransition { .. }
                | Self::AmbiguousTransition { .. }
        )
    }

    /// Phase of the failing hook, if a hook failed.
    pub fn hook_phase(&self) -> Option<HookPhase> {
        match self {
            Self::Hook { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Whether the entity ended up in the target state.
    ///
    /// Only a change-log failure leaves the transition applied.
    pub fn state_applied(&self) -> bool {
        matches!(self, Self::LogPersist { .. })
    }
}
