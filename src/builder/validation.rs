//! Definition checks using Validation.
//!
//! `trigger` resolves transitions at runtime and reports ambiguity then. These
//! checks find the same problems up front, from the definition alone, and
//! accumulate every issue instead of stopping at the first one.

use crate::builder::event::Event;
use crate::builder::machine::StateMachine;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A problem found in a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionIssue {
    #[error("Initial state not specified. Call .initial(name) before triggering")]
    MissingInitialState,

    #[error("Event '{event}' has no transitions")]
    EventWithoutTransitions { event: String },

    #[error("Event '{event}' has a transition with an empty target state")]
    EmptyTarget { event: String },

    /// Two transitions of one event can match the same source state.
    /// `state` is `None` when either side accepts any state.
    #[error("Event '{event}' transitions to '{first}' and '{second}' overlap on {}", .state.as_deref().unwrap_or("any state"))]
    OverlappingTransitions {
        event: String,
        first: String,
        second: String,
        state: Option<String>,
    },
}

type Check = Validation<(), NonEmptyVec<DefinitionIssue>>;

impl<E, T> StateMachine<E, T> {
    /// Check the definition, accumulating ALL issues.
    ///
    /// Returns `Validation::Success(())` for a well-formed machine, or
    /// `Validation::Failure` with every issue found.
    pub fn validate(&self) -> Check {
        let mut checks: Vec<Check> = Vec::new();

        checks.push(if self.initial_state().is_empty() {
            Validation::fail(DefinitionIssue::MissingInitialState)
        } else {
            Validation::success(())
        });

        for event in self.events() {
            checks.extend(check_event(event));
        }

        Validation::all_vec(checks).map(|_| ())
    }
}

fn check_event<E, T>(event: &Event<E, T>) -> Vec<Check> {
    let transitions = event.transitions();
    if transitions.is_empty() {
        return vec![Validation::fail(DefinitionIssue::EventWithoutTransitions {
            event: event.name().to_string(),
        })];
    }

    let mut checks = Vec::new();
    for transition in transitions {
        if transition.to_state().is_empty() {
            checks.push(Validation::fail(DefinitionIssue::EmptyTarget {
                event: event.name().to_string(),
            }));
        }
    }

    for (i, first) in transitions.iter().enumerate() {
        for second in &transitions[i + 1..] {
            let overlap = if first.froms().is_empty() || second.froms().is_empty() {
                Some(None)
            } else {
                first
                    .froms()
                    .iter()
                    .find(|state| second.froms().contains(*state))
                    .map(|state| Some(state.clone()))
            };

            if let Some(state) = overlap {
                checks.push(Validation::fail(DefinitionIssue::OverlappingTransitions {
                    event: event.name().to_string(),
                    first: first.to_state().to_string(),
                    second: second.to_state().to_string(),
                    state,
                }));
            }
        }
    }

    checks
}
