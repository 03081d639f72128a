//! The configuration root for one attribute of a host type.

use super::callback::{Callback, Callbacks, TransitionObserver};
use super::error::MachineError;
use super::event::Event;
use super::subject::Subject;
use super::transition::Transition;
use crate::builder::MachineBuilder;
use crate::core::{describe, State};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Reads the attribute's current value from the entity.
pub type Reader<T, S> = Arc<dyn Fn(&T) -> Option<S> + Send + Sync>;

/// Writes a new attribute value onto the entity.
pub type Writer<T, S> = Arc<dyn Fn(&mut T, Option<S>) + Send + Sync>;

/// Invokes the named host action with the fire arguments; returns success.
pub type ActionHook<T, A> = Arc<dyn Fn(&mut T, &str, &A) -> bool + Send + Sync>;

/// Runs the action block inside a host-managed transaction.
pub type TransactionHook<T> =
    Arc<dyn Fn(&mut T, &mut dyn FnMut(&mut T) -> bool) -> bool + Send + Sync>;

/// Options accepted by [`Machine::configure`].
///
/// Unknown keys in a deserialized configuration are ignored; they belong to
/// whatever integration layer owns the attribute.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(bound(deserialize = "S: Deserialize<'de>"))]
pub struct MachineOptions<S> {
    /// Value written by [`Machine::initialize`] when the attribute is unset.
    #[serde(default)]
    pub initial: Option<S>,

    /// Name of the host action invoked once the before-callbacks pass.
    #[serde(default)]
    pub action: Option<String>,
}

impl<S> MachineOptions<S> {
    pub fn new() -> Self {
        Self {
            initial: None,
            action: None,
        }
    }

    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

impl<S> Default for MachineOptions<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// A state machine governing one attribute of a host type `T`.
///
/// Built once through [`Machine::configure`] and read-only afterwards, so a
/// machine can be shared between threads. The machine does not serialize
/// concurrent transitions on the same entity; hosts that fire events on one
/// entity from several threads must lock the entity themselves.
///
/// # Example
///
/// ```rust
/// use switchyard::core::GuardOptions;
/// use switchyard::machine::{Machine, MachineOptions};
///
/// struct Vehicle {
///     state: Option<&'static str>,
/// }
///
/// let machine: Machine<Vehicle, &str> =
///     Machine::configure("state", MachineOptions::new().initial("parked"))
///         .reader(|vehicle: &Vehicle| vehicle.state)
///         .writer(|vehicle: &mut Vehicle, state| vehicle.state = state)
///         .event("ignite", |event| {
///             event.transition(GuardOptions::new().from("parked").to("idling"))?;
///             Ok(())
///         })?
///         .build()?;
///
/// let mut vehicle = Vehicle { state: None };
/// machine.initialize(&mut vehicle);
///
/// assert!(machine.can_fire(&vehicle, "ignite")?);
/// assert!(machine.fire(&mut vehicle, "ignite", &())?);
/// assert_eq!(vehicle.state, Some("idling"));
/// assert!(!machine.fire(&mut vehicle, "ignite", &())?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Machine<T, S, A = ()> {
    pub(crate) attribute: String,
    pub(crate) initial: Option<S>,
    pub(crate) action: Option<String>,
    pub(crate) reader: Reader<T, S>,
    pub(crate) writer: Writer<T, S>,
    pub(crate) action_hook: Option<ActionHook<T, A>>,
    pub(crate) transaction_hook: Option<TransactionHook<T>>,
    pub(crate) events: Vec<Event<T, S>>,
    pub(crate) callbacks: Callbacks<T, S, A>,
    pub(crate) observers: Vec<Arc<dyn TransitionObserver<T, S, A>>>,
    pub(crate) known_states: Vec<Option<S>>,
}

impl<T, S: State, A> Machine<T, S, A> {
    /// Start configuring a machine for `attribute`.
    pub fn configure(attribute: impl Into<String>, options: MachineOptions<S>) -> MachineBuilder<T, S, A> {
        MachineBuilder::new(attribute, options)
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn initial(&self) -> Option<&S> {
        self.initial.as_ref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Events in declaration order.
    pub fn events(&self) -> impl Iterator<Item = &Event<T, S>> {
        self.events.iter()
    }

    pub fn event(&self, name: &str) -> Option<&Event<T, S>> {
        self.events.iter().find(|event| event.name() == name)
    }

    pub fn before_callbacks(&self) -> &[Callback<T, S, A>] {
        &self.callbacks.before
    }

    pub fn after_callbacks(&self) -> &[Callback<T, S, A>] {
        &self.callbacks.after
    }

    pub(crate) fn observers(&self) -> &[Arc<dyn TransitionObserver<T, S, A>>] {
        &self.observers
    }

    /// Every state the machine references: the initial state, the events'
    /// states, callback filter states and extra declared states.
    pub fn known_states(&self) -> &[Option<S>] {
        &self.known_states
    }

    /// Current attribute value of `entity`.
    pub fn read(&self, entity: &T) -> Option<S> {
        (self.reader)(entity)
    }

    pub(crate) fn write(&self, entity: &mut T, state: Option<S>) {
        (self.writer)(entity, state)
    }

    /// Write the initial state if the attribute is still unset.
    pub fn initialize(&self, entity: &mut T) {
        if self.read(entity).is_none() && self.initial.is_some() {
            debug!(
                attribute = %self.attribute,
                initial = %describe(&self.initial),
                "initializing attribute"
            );
            self.write(entity, self.initial.clone());
        }
    }

    /// Whether the entity is currently in `state`.
    ///
    /// Fails with [`MachineError::UnknownState`] when `state` is not one of
    /// the machine's known states.
    pub fn is_state(&self, entity: &T, state: impl Into<Option<S>>) -> Result<bool, MachineError> {
        let state = state.into();
        if !self.known_states.contains(&state) {
            return Err(MachineError::UnknownState {
                attribute: self.attribute.clone(),
                state: describe(&state),
            });
        }
        Ok(self.read(entity) == state)
    }

    pub fn can_fire(&self, entity: &T, event: &str) -> Result<bool, MachineError> {
        Ok(self.lookup(event)?.can_fire(self, entity))
    }

    pub fn next_transition(
        &self,
        entity: &T,
        event: &str,
    ) -> Result<Option<Transition<'_, T, S, A>>, MachineError> {
        Ok(self.lookup(event)?.next_transition(self, entity))
    }

    /// Fire `event`, returning whether the transition succeeded.
    pub fn fire(&self, entity: &mut T, event: &str, args: &A) -> Result<bool, MachineError> {
        Ok(self.lookup(event)?.fire(self, entity, args))
    }

    /// Fire `event`, failing with [`MachineError::InvalidTransition`] when
    /// the transition did not succeed.
    pub fn fire_strict(&self, entity: &mut T, event: &str, args: &A) -> Result<(), MachineError> {
        if self.fire(entity, event, args)? {
            Ok(())
        } else {
            Err(MachineError::InvalidTransition {
                attribute: self.attribute.clone(),
                event: event.to_string(),
                from: describe(&self.read(entity)),
            })
        }
    }

    /// Bind `entity` to this machine for per-entity operations.
    pub fn subject<'m, 'e>(&'m self, entity: &'e mut T) -> Subject<'m, 'e, T, S, A> {
        Subject::new(self, entity)
    }

    /// Invoke the configured action, inside the transaction hook if present.
    pub(crate) fn run_action(&self, entity: &mut T, args: &A) -> bool {
        let (Some(action), Some(hook)) = (self.action.as_deref(), self.action_hook.as_ref()) else {
            return true;
        };

        let mut invoke = |entity: &mut T| hook(entity, action, args);
        match &self.transaction_hook {
            Some(transaction) => transaction(entity, &mut invoke),
            None => invoke(entity),
        }
    }

    fn lookup(&self, event: &str) -> Result<&Event<T, S>, MachineError> {
        self.event(event).ok_or_else(|| MachineError::UnknownEvent {
            attribute: self.attribute.clone(),
            event: event.to_string(),
        })
    }
}

impl<T, S: State, A> fmt::Debug for Machine<T, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("attribute", &self.attribute)
            .field("initial", &self.initial)
            .field("action", &self.action)
            .field("events", &self.events)
            .field("before_callbacks", &self.callbacks.before.len())
            .field("after_callbacks", &self.callbacks.after.len())
            .field("observers", &self.observers.len())
            .field("known_states", &self.known_states)
            .finish()
    }
}
