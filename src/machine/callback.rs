//! Transition callbacks and observers.

use super::transition::Transition;
use crate::core::{Guard, Query, State};
use std::fmt;
use std::sync::Arc;

/// Callable run around a transition. Returning `false` stops the chain.
pub type CallbackFn<T, S, A> = Arc<dyn Fn(&mut T, &Transition<'_, T, S, A>) -> bool + Send + Sync>;

/// A callback paired with the guard that decides which transitions it runs for.
pub struct Callback<T, S, A = ()> {
    filter: Guard<T, S>,
    hook: CallbackFn<T, S, A>,
}

impl<T, S: State, A> Callback<T, S, A> {
    pub fn new<F>(filter: Guard<T, S>, hook: F) -> Self
    where
        F: Fn(&mut T, &Transition<'_, T, S, A>) -> bool + Send + Sync + 'static,
    {
        Self {
            filter,
            hook: Arc::new(hook),
        }
    }

    pub fn filter(&self) -> &Guard<T, S> {
        &self.filter
    }

    pub fn matches(&self, entity: &T, query: &Query<S>) -> bool {
        self.filter.matches(entity, query)
    }

    pub fn call(&self, entity: &mut T, transition: &Transition<'_, T, S, A>) -> bool {
        (self.hook)(entity, transition)
    }
}

impl<T, S: State, A> Clone for Callback<T, S, A> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            hook: Arc::clone(&self.hook),
        }
    }
}

impl<T, S: State, A> fmt::Debug for Callback<T, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// Registered before- and after-transition callbacks, in registration order.
pub struct Callbacks<T, S, A = ()> {
    pub before: Vec<Callback<T, S, A>>,
    pub after: Vec<Callback<T, S, A>>,
}

impl<T, S, A> Default for Callbacks<T, S, A> {
    fn default() -> Self {
        Self {
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

/// Receives notifications about every performed transition of a machine.
///
/// Observers run after the callbacks of the same phase and cannot halt a
/// transition. They are not notified when a before-callback halts. Within a
/// phase the event hook is called before the generic transition hook.
pub trait TransitionObserver<T, S, A = ()>: Send + Sync {
    /// Called for the fired event by name, ahead of `before_transition`.
    fn before_event(&self, _event: &str, _entity: &T, _transition: &Transition<'_, T, S, A>) {}

    fn before_transition(&self, _entity: &T, _transition: &Transition<'_, T, S, A>) {}

    fn after_event(&self, _event: &str, _entity: &T, _transition: &Transition<'_, T, S, A>) {}

    fn after_transition(&self, _entity: &T, _transition: &Transition<'_, T, S, A>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GuardOptions;

    #[test]
    fn matches_delegates_to_filter() {
        let filter = Guard::new(GuardOptions::<(), &str>::new().to("error")).unwrap();
        let callback: Callback<(), &str> = Callback::new(filter, |_, _| true);

        assert!(callback.matches(&(), &Query::new().to("error")));
        assert!(!callback.matches(&(), &Query::new().to("on")));
        assert_eq!(callback.filter().known_states(), vec![Some("error")]);
    }

    #[test]
    fn debug_shows_filter() {
        let filter = Guard::new(GuardOptions::<(), &str>::new().on("ignite")).unwrap();
        let callback: Callback<(), &str> = Callback::new(filter, |_, _| true);

        assert!(format!("{callback:?}").contains("ignite"));
    }
}
