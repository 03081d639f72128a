//! Builder for configuring machines.

use crate::core::{push_unique, ConfigError, Guard, GuardOptions, State};
use crate::machine::{
    ActionHook, Callback, Callbacks, Event, Machine, MachineOptions, Reader, TransactionHook,
    Transition, TransitionObserver, Writer,
};
use std::sync::Arc;

/// Builder collecting a machine's configuration during the setup phase.
///
/// Declarations are append-only; [`build`](MachineBuilder::build) freezes
/// them into a read-only [`Machine`].
pub struct MachineBuilder<T, S, A = ()> {
    attribute: String,
    options: MachineOptions<S>,
    reader: Option<Reader<T, S>>,
    writer: Option<Writer<T, S>>,
    action_hook: Option<ActionHook<T, A>>,
    transaction_hook: Option<TransactionHook<T>>,
    events: Vec<Event<T, S>>,
    callbacks: Callbacks<T, S, A>,
    observers: Vec<Arc<dyn TransitionObserver<T, S, A>>>,
    other_states: Vec<Option<S>>,
}

impl<T, S: State, A> MachineBuilder<T, S, A> {
    pub fn new(attribute: impl Into<String>, options: MachineOptions<S>) -> Self {
        Self {
            attribute: attribute.into(),
            options,
            reader: None,
            writer: None,
            action_hook: None,
            transaction_hook: None,
            events: Vec::new(),
            callbacks: Callbacks::default(),
            observers: Vec::new(),
            other_states: Vec::new(),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Set how the attribute is read from the entity (required).
    pub fn reader<F>(mut self, reader: F) -> Self
    where
        F: Fn(&T) -> Option<S> + Send + Sync + 'static,
    {
        self.reader = Some(Arc::new(reader));
        self
    }

    /// Set how the attribute is written to the entity (required).
    pub fn writer<F>(mut self, writer: F) -> Self
    where
        F: Fn(&mut T, Option<S>) + Send + Sync + 'static,
    {
        self.writer = Some(Arc::new(writer));
        self
    }

    /// Set the hook that carries out the configured action.
    pub fn action_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T, &str, &A) -> bool + Send + Sync + 'static,
    {
        self.action_hook = Some(Arc::new(hook));
        self
    }

    /// Wrap every action invocation in a host transaction.
    pub fn transaction_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T, &mut dyn FnMut(&mut T) -> bool) -> bool + Send + Sync + 'static,
    {
        self.transaction_hook = Some(Arc::new(hook));
        self
    }

    /// Declare an event, or re-open an existing one to append guards.
    pub fn event<F>(mut self, name: &str, define: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&mut Event<T, S>) -> Result<(), ConfigError>,
    {
        let index = match self.events.iter().position(|event| event.name() == name) {
            Some(index) => index,
            None => {
                self.events.push(Event::new(name));
                self.events.len() - 1
            }
        };
        define(&mut self.events[index])?;
        Ok(self)
    }

    /// Declare `name` as a copy of the already declared `template` event.
    pub fn duplicate_event(mut self, template: &str, name: &str) -> Result<Self, ConfigError> {
        let copy = self
            .events
            .iter()
            .find(|event| event.name() == template)
            .map(|event| event.duplicate(name))
            .ok_or_else(|| ConfigError::UndefinedEvent {
                name: template.to_string(),
            })?;

        match self.events.iter_mut().find(|event| event.name() == name) {
            Some(existing) => *existing = copy,
            None => self.events.push(copy),
        }
        Ok(self)
    }

    /// Run `callback` before every transition matching `filter`.
    pub fn before_transition<F>(mut self, filter: GuardOptions<T, S>, callback: F) -> Result<Self, ConfigError>
    where
        F: Fn(&mut T, &Transition<'_, T, S, A>) -> bool + Send + Sync + 'static,
    {
        let filter = Guard::new(filter)?;
        self.callbacks.before.push(Callback::new(filter, callback));
        Ok(self)
    }

    /// Run `callback` after every transition matching `filter`.
    pub fn after_transition<F>(mut self, filter: GuardOptions<T, S>, callback: F) -> Result<Self, ConfigError>
    where
        F: Fn(&mut T, &Transition<'_, T, S, A>) -> bool + Send + Sync + 'static,
    {
        let filter = Guard::new(filter)?;
        self.callbacks.after.push(Callback::new(filter, callback));
        Ok(self)
    }

    /// Declare states that no transition references.
    pub fn other_states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<S>>,
    {
        self.other_states.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn observe<O>(mut self, observer: O) -> Self
    where
        O: TransitionObserver<T, S, A> + 'static,
    {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Freeze the configuration into a machine.
    pub fn build(self) -> Result<Machine<T, S, A>, ConfigError> {
        let reader = self.reader.ok_or(ConfigError::MissingReader)?;
        let writer = self.writer.ok_or(ConfigError::MissingWriter)?;
        if let (Some(action), None) = (&self.options.action, &self.action_hook) {
            return Err(ConfigError::MissingActionHook {
                action: action.clone(),
            });
        }

        let mut known_states = Vec::new();
        if self.options.initial.is_some() {
            push_unique(&mut known_states, &self.options.initial);
        }
        for event in &self.events {
            for state in event.known_states() {
                push_unique(&mut known_states, state);
            }
        }
        for callback in self.callbacks.before.iter().chain(&self.callbacks.after) {
            for state in callback.filter().known_states() {
                push_unique(&mut known_states, &state);
            }
        }
        for state in &self.other_states {
            push_unique(&mut known_states, state);
        }

        Ok(Machine {
            attribute: self.attribute,
            initial: self.options.initial,
            action: self.options.action,
            reader,
            writer,
            action_hook: self.action_hook,
            transaction_hook: self.transaction_hook,
            events: self.events,
            callbacks: self.callbacks,
            observers: self.observers,
            known_states,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionKey;

    struct Door {
        state: Option<String>,
    }

    fn builder() -> MachineBuilder<Door, String> {
        MachineBuilder::new("state", MachineOptions::new())
            .reader(|door: &Door| door.state.clone())
            .writer(|door: &mut Door, state| door.state = state)
    }

    #[test]
    fn builder_requires_reader() {
        let result = MachineBuilder::<Door, String>::new("state", MachineOptions::new())
            .writer(|door: &mut Door, state| door.state = state)
            .build();

        assert!(matches!(result, Err(ConfigError::MissingReader)));
    }

    #[test]
    fn builder_requires_writer() {
        let result = MachineBuilder::<Door, String>::new("state", MachineOptions::new())
            .reader(|door: &Door| door.state.clone())
            .build();

        assert!(matches!(result, Err(ConfigError::MissingWriter)));
    }

    #[test]
    fn action_requires_hook() {
        let result = MachineBuilder::<Door, String>::new(
            "state",
            MachineOptions::new().action("save"),
        )
        .reader(|door: &Door| door.state.clone())
        .writer(|door: &mut Door, state| door.state = state)
        .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingActionHook { ref action }) if action == "save"
        ));
    }

    #[test]
    fn callback_filters_reject_conflicts() {
        let result = builder().after_transition(
            GuardOptions::new().on("open").except_on("close"),
            |_: &mut Door, _| true,
        );

        assert!(matches!(
            result,
            Err(ConfigError::ConflictingKeys {
                first: OptionKey::On,
                second: OptionKey::ExceptOn,
            })
        ));
    }

    #[test]
    fn duplicate_event_copies_template() {
        let machine = builder()
            .event("open", |event| {
                event.transition(
                    GuardOptions::new()
                        .from("closed".to_string())
                        .to("open".to_string()),
                )?;
                Ok(())
            })
            .unwrap()
            .duplicate_event("open", "unlock")
            .unwrap()
            .event("unlock", |event| {
                event.transition(
                    GuardOptions::new()
                        .from("locked".to_string())
                        .to("closed".to_string()),
                )?;
                Ok(())
            })
            .unwrap()
            .build()
            .unwrap();

        let open = machine.event("open").unwrap();
        let unlock = machine.event("unlock").unwrap();
        assert_eq!(open.guards().len(), 1);
        assert_eq!(unlock.guards().len(), 2);
    }

    #[test]
    fn duplicate_of_undefined_event_fails() {
        let result = builder().duplicate_event("open", "unlock");

        assert!(matches!(
            result,
            Err(ConfigError::UndefinedEvent { ref name }) if name == "open"
        ));
    }

    #[test]
    fn unset_initial_is_not_a_known_state() {
        let machine = builder().other_states([Some("ajar".to_string()), None]).build().unwrap();

        assert_eq!(machine.known_states(), &[Some("ajar".to_string()), None]);
    }
}
