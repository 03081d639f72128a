//! Events: named, ordered collections of guards.

use super::machine::Machine;
use super::transition::Transition;
use crate::core::{
    describe, push_unique, ConfigError, Guard, GuardOptions, OptionKey, Query, State, Target,
};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Keys accepted by [`Event::transition`]; the event name already scopes `on`.
const TRANSITION_KEYS: [OptionKey; 5] = [
    OptionKey::To,
    OptionKey::From,
    OptionKey::ExceptFrom,
    OptionKey::If,
    OptionKey::Unless,
];

/// A named event whose guards are evaluated in declaration order.
///
/// The first guard matching the entity's current state wins, so the order in
/// which [`transition`](Event::transition) is called is significant.
pub struct Event<T, S> {
    name: String,
    guards: Vec<Guard<T, S>>,
    known_states: OnceLock<Vec<Option<S>>>,
}

impl<T, S: State> Event<T, S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guards: Vec::new(),
            known_states: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guards(&self) -> &[Guard<T, S>] {
        &self.guards
    }

    /// Declare a transition for this event.
    ///
    /// Accepts `to`, `from`, `except_from`, `if` and `unless`; any other key
    /// is rejected by name. `to` may be omitted (the state is left as is),
    /// a single literal, or a deferred computation.
    pub fn transition(&mut self, options: GuardOptions<T, S>) -> Result<&Guard<T, S>, ConfigError> {
        options.assert_valid_keys(&TRANSITION_KEYS)?;
        let guard = Guard::new(options)?;
        if guard.target_count() > 1 {
            return Err(ConfigError::AmbiguousTarget {
                count: guard.target_count(),
            });
        }

        self.known_states = OnceLock::new();
        self.guards.push(guard);
        Ok(&self.guards[self.guards.len() - 1])
    }

    /// Union of every guard's known states, in first-seen order.
    pub fn known_states(&self) -> &[Option<S>] {
        self.known_states.get_or_init(|| {
            let mut states = Vec::new();
            for guard in &self.guards {
                for state in guard.known_states() {
                    push_unique(&mut states, &state);
                }
            }
            states
        })
    }

    /// Copy this event under a new name with an independent guard list.
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        let mut event = self.clone();
        event.name = name.into();
        event
    }

    /// Resolve the transition that firing this event would perform now.
    ///
    /// Returns `None` when no guard matches the current state. A deferred
    /// target is computed here, on every call. A guard without a target, or
    /// whose literal target is `None`, leaves the state as it is.
    pub fn next_transition<'m, A>(
        &self,
        machine: &'m Machine<T, S, A>,
        entity: &T,
    ) -> Option<Transition<'m, T, S, A>> {
        let from = machine.read(entity);
        let query = Query::new().from(from.clone());

        let (index, guard) = self
            .guards
            .iter()
            .enumerate()
            .find(|(_, guard)| guard.matches(entity, &query))?;

        let to = match guard.target() {
            None | Some(Target::Literal(None)) => from.clone(),
            Some(target) => target.resolve(),
        };
        trace!(
            attribute = machine.attribute(),
            event = %self.name,
            guard = index,
            from = %describe(&from),
            to = %describe(&to),
            "guard selected"
        );

        Some(Transition::new(machine, self.name.clone(), from, to))
    }

    pub fn can_fire<A>(&self, machine: &Machine<T, S, A>, entity: &T) -> bool {
        self.next_transition(machine, entity).is_some()
    }

    /// Perform the next transition, or return `false` without side effects
    /// when none applies.
    pub fn fire<A>(&self, machine: &Machine<T, S, A>, entity: &mut T, args: &A) -> bool {
        match self.next_transition(machine, entity) {
            Some(mut transition) => {
                let result = transition.perform(entity, args);
                debug!(
                    attribute = machine.attribute(),
                    event = %self.name,
                    from = %describe(transition.from()),
                    to = %describe(transition.to()),
                    result,
                    "event fired"
                );
                result
            }
            None => {
                debug!(
                    attribute = machine.attribute(),
                    event = %self.name,
                    from = %describe(&machine.read(entity)),
                    "no transition available"
                );
                false
            }
        }
    }
}

impl<T, S: State> Clone for Event<T, S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            guards: self.guards.clone(),
            known_states: OnceLock::new(),
        }
    }
}

impl<T, S: State> fmt::Debug for Event<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("guards", &self.guards)
            .finish()
    }
}
