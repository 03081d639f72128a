//! One-shot transition attempts and their callback orchestration.

use super::callback::Callback;
use super::machine::Machine;
use crate::core::{describe, Query, State};
use std::fmt;
use tracing::{debug, trace};

/// A concrete `(from, to)` state change attempt for one event fire.
///
/// Built by [`Event::next_transition`](super::Event::next_transition) once a
/// guard has matched; the target is already resolved, so a deferred target
/// is never recomputed during [`perform`](Transition::perform). A transition
/// is performed at most once; every fire attempt builds a fresh one.
pub struct Transition<'m, T, S, A = ()> {
    machine: &'m Machine<T, S, A>,
    event: String,
    from: Option<S>,
    to: Option<S>,
    result: Option<bool>,
}

impl<'m, T, S: State, A> Transition<'m, T, S, A> {
    pub fn new(
        machine: &'m Machine<T, S, A>,
        event: impl Into<String>,
        from: Option<S>,
        to: Option<S>,
    ) -> Self {
        Self {
            machine,
            event: event.into(),
            from,
            to,
            result: None,
        }
    }

    pub fn machine(&self) -> &'m Machine<T, S, A> {
        self.machine
    }

    pub fn attribute(&self) -> &str {
        self.machine.attribute()
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn from(&self) -> &Option<S> {
        &self.from
    }

    pub fn to(&self) -> &Option<S> {
        &self.to
    }

    /// Outcome of the action, available to after-callbacks and once
    /// `perform` has returned. `None` before the action has run.
    pub fn result(&self) -> Option<bool> {
        self.result
    }

    /// True when the transition leaves the state unchanged.
    pub fn is_loopback(&self) -> bool {
        self.from == self.to
    }

    /// The context callback filters are matched against.
    pub fn query(&self) -> Query<S> {
        Query {
            from: Some(self.from.clone()),
            to: Some(self.to.clone()),
            on: Some(self.event.clone()),
        }
    }

    /// Run the transition against `entity`.
    ///
    /// Before-callbacks run in registration order and any `false` aborts the
    /// whole transition with nothing written. Otherwise the target is
    /// written, the action (if configured) decides the result, and the
    /// after-callbacks run even when the action failed. An after-callback
    /// returning `false` stops the remaining after-callbacks but never
    /// changes the result.
    pub fn perform(&mut self, entity: &mut T, args: &A) -> bool {
        let machine = self.machine;
        let query = self.query();

        trace!(
            attribute = machine.attribute(),
            event = %self.event,
            from = %describe(&self.from),
            to = %describe(&self.to),
            "performing transition"
        );

        let before = select(machine.before_callbacks(), entity, &query);
        for (index, callback) in before.into_iter().enumerate() {
            if !callback.call(entity, self) {
                debug!(
                    attribute = machine.attribute(),
                    event = %self.event,
                    callback = index,
                    "before_transition callback halted transition"
                );
                self.result = Some(false);
                return false;
            }
        }
        for observer in machine.observers() {
            observer.before_event(&self.event, entity, self);
            observer.before_transition(entity, self);
        }

        machine.write(entity, self.to.clone());

        let result = machine.run_action(entity, args);
        if !result {
            debug!(
                attribute = machine.attribute(),
                event = %self.event,
                action = machine.action().unwrap_or_default(),
                "action reported failure"
            );
        }
        self.result = Some(result);

        let after = select(machine.after_callbacks(), entity, &query);
        for (index, callback) in after.into_iter().enumerate() {
            if !callback.call(entity, self) {
                debug!(
                    attribute = machine.attribute(),
                    event = %self.event,
                    callback = index,
                    "after_transition callback stopped remaining callbacks"
                );
                break;
            }
        }
        for observer in machine.observers() {
            observer.after_event(&self.event, entity, self);
            observer.after_transition(entity, self);
        }

        result
    }
}

fn select<'c, T, S: State, A>(
    callbacks: &'c [Callback<T, S, A>],
    entity: &T,
    query: &Query<S>,
) -> Vec<&'c Callback<T, S, A>> {
    callbacks
        .iter()
        .filter(|callback| callback.matches(entity, query))
        .collect()
}

impl<T, S: State, A> fmt::Debug for Transition<'_, T, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("attribute", &self.machine.attribute())
            .field("event", &self.event)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("result", &self.result)
            .finish()
    }
}
