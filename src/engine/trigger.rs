//! Performing events on entities.

use crate::builder::{EventTransition, StateMachine};
use crate::changelog::{ChangeLogScope, StateChangeLog};
use crate::core::{Hook, HookPhase, LogReference, Referable, Stater};
use crate::engine::error::TransitionError;
use tracing::{debug, trace};

impl<E, T> StateMachine<E, T>
where
    E: Stater + Referable,
    T: ChangeLogScope,
{
    /// Perform `event` on `entity`.
    ///
    /// An entity with an empty state is first moved into the initial state.
    /// Exactly one transition of the event must accept the entity's state.
    /// Hooks then run in this order, each list in registration order:
    ///
    /// 1. exit hooks of the current state
    /// 2. before hooks of the transition
    /// 3. *the entity's state is set to the target*
    /// 4. enter hooks of the target state
    /// 5. after hooks of the transition
    ///
    /// The first failing hook stops the run. A failure in steps 4 or 5 puts the
    /// entity back into its previous state.
    ///
    /// With a `scope`, a [`StateChangeLog`] holding the concatenated `notes` is
    /// appended through it after the hooks succeed. If that append fails the
    /// state change stays applied and [`TransitionError::LogPersist`] is
    /// returned.
    ///
    /// The entity's table name and reference key are read once, before any
    /// hook runs, and the record is filed under them. Hooks must not change
    /// the entity's identity: a key assigned inside a hook is not seen by this
    /// trigger, and the record stays under the key the entity had on entry.
    pub fn trigger(
        &self,
        event: &str,
        entity: &mut E,
        mut scope: Option<&mut T>,
        notes: &[&str],
    ) -> Result<(), TransitionError> {
        let reference = if scope.is_some() {
            Some(LogReference::of(entity)?)
        } else {
            None
        };

        let state_was = self.enter_initial(entity);
        let transition = self.resolve(event, &state_was)?;

        if let Some(state) = self.get_state(&state_was) {
            run_hooks(
                state.exits(),
                HookPhase::Exit,
                event,
                entity,
                scope.as_deref_mut(),
            )?;
        }

        run_hooks(
            transition.befores(),
            HookPhase::Before,
            event,
            entity,
            scope.as_deref_mut(),
        )?;

        entity.set_state(transition.to_state());

        if let Some(state) = self.get_state(transition.to_state()) {
            if let Err(err) = run_hooks(
                state.enters(),
                HookPhase::Enter,
                event,
                entity,
                scope.as_deref_mut(),
            ) {
                entity.set_state(&state_was);
                return Err(err);
            }
        }

        if let Err(err) = run_hooks(
            transition.afters(),
            HookPhase::After,
            event,
            entity,
            scope.as_deref_mut(),
        ) {
            entity.set_state(&state_was);
            return Err(err);
        }

        debug!(
            event,
            from = %state_was,
            to = transition.to_state(),
            "Transition applied"
        );

        if let (Some(scope), Some(reference)) = (scope, reference) {
            let record = StateChangeLog::new(
                reference.table,
                reference.key,
                state_was.as_str(),
                transition.to_state(),
                notes.concat(),
            )
            .created_by(scope.actor());

            scope
                .append(record)
                .map_err(|source| TransitionError::LogPersist {
                    event: event.to_string(),
                    from: state_was.clone(),
                    to: transition.to_state().to_string(),
                    source,
                })?;

            debug!(event, to = transition.to_state(), "State change logged");
        }

        Ok(())
    }
}

impl<E, T> StateMachine<E, T>
where
    E: Stater,
{
    /// Whether `event` would resolve to exactly one transition for `entity`.
    ///
    /// Runs no hooks and does not touch the entity; an empty state is treated
    /// as the initial state.
    pub fn can_trigger(&self, event: &str, entity: &E) -> bool {
        let state = self.effective_state(entity.state());
        self.resolve(event, state).is_ok()
    }

    /// Names of the events that can be performed from `state`, sorted.
    pub fn permitted_events(&self, state: &str) -> Vec<&str> {
        let state = self.effective_state(state);
        self.event_names()
            .into_iter()
            .filter(|event| self.resolve(event, state).is_ok())
            .collect()
    }

    fn effective_state<'a>(&'a self, state: &'a str) -> &'a str {
        if state.is_empty() {
            self.initial_state()
        } else {
            state
        }
    }

    /// Current state of `entity`, moving it into the initial state first if
    /// it has none.
    fn enter_initial(&self, entity: &mut E) -> String {
        if entity.state().is_empty() {
            entity.set_state(self.initial_state());
        }
        entity.state().to_string()
    }

    /// The single transition of `event` that accepts `state`.
    fn resolve(
        &self,
        event: &str,
        state: &str,
    ) -> Result<&EventTransition<E, T>, TransitionError> {
        let Some(definition) = self.get_event(event) else {
            return Err(TransitionError::UnknownEvent {
                event: event.to_string(),
                state: state.to_string(),
            });
        };

        match definition.candidates(state).as_slice() {
            [transition] => Ok(*transition),
            [] => Err(TransitionError::NoMatchingTransition {
                event: event.to_string(),
                state: state.to_string(),
            }),
            many => Err(TransitionError::AmbiguousTransition {
                event: event.to_string(),
                state: state.to_string(),
                candidates: many.len(),
            }),
        }
    }
}

fn run_hooks<E, T>(
    hooks: &[Hook<E, T>],
    phase: HookPhase,
    event: &str,
    entity: &mut E,
    mut scope: Option<&mut T>,
) -> Result<(), TransitionError> {
    for (index, hook) in hooks.iter().enumerate() {
        trace!(event, %phase, index, "Running hook");
        hook.call(entity, scope.as_deref_mut())
            .map_err(|source| TransitionError::Hook {
                event: event.to_string(),
                phase,
                source,
            })?;
    }
    Ok(())
}
