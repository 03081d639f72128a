//! Per-entity view over a machine.

use super::error::MachineError;
use super::machine::Machine;
use super::transition::Transition;
use crate::core::State;

/// An entity bound to the machine that governs one of its attributes.
///
/// Exposes the event operations a host would otherwise attach to the entity
/// type itself (`can_fire`, `fire`, the strict variant, state predicates).
pub struct Subject<'m, 'e, T, S, A = ()> {
    machine: &'m Machine<T, S, A>,
    entity: &'e mut T,
}

impl<'m, 'e, T, S: State, A> Subject<'m, 'e, T, S, A> {
    pub fn new(machine: &'m Machine<T, S, A>, entity: &'e mut T) -> Self {
        Self { machine, entity }
    }

    pub fn machine(&self) -> &'m Machine<T, S, A> {
        self.machine
    }

    pub fn entity(&self) -> &T {
        self.entity
    }

    pub fn state(&self) -> Option<S> {
        self.machine.read(self.entity)
    }

    pub fn is(&self, state: impl Into<Option<S>>) -> Result<bool, MachineError> {
        self.machine.is_state(self.entity, state)
    }

    pub fn initialize(&mut self) {
        self.machine.initialize(self.entity);
    }

    pub fn can_fire(&self, event: &str) -> Result<bool, MachineError> {
        self.machine.can_fire(self.entity, event)
    }

    pub fn next_transition(&self, event: &str) -> Result<Option<Transition<'m, T, S, A>>, MachineError> {
        self.machine.next_transition(self.entity, event)
    }

    pub fn fire(&mut self, event: &str, args: &A) -> Result<bool, MachineError> {
        self.machine.fire(self.entity, event, args)
    }

    pub fn fire_strict(&mut self, event: &str, args: &A) -> Result<(), MachineError> {
        self.machine.fire_strict(self.entity, event, args)
    }
}
