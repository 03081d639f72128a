//! Guards: single transition rules matched against a state/event context.

use super::error::ConfigError;
use super::matcher::Matcher;
use super::options::{DeferredState, GuardOptions, OptionKey, Predicate, TargetOption};
use super::state::{push_unique, State};
use std::fmt;

/// A candidate state/event context to test a guard against.
///
/// Dimensions left out of the query are not filtered on. Supplying a
/// dimension with `None` asks about an unset attribute value, which is
/// different from leaving the dimension out.
#[derive(Clone, Debug, PartialEq)]
pub struct Query<S> {
    pub from: Option<Option<S>>,
    pub to: Option<Option<S>>,
    pub on: Option<String>,
}

impl<S: State> Query<S> {
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            on: None,
        }
    }

    pub fn from(mut self, state: impl Into<Option<S>>) -> Self {
        self.from = Some(state.into());
        self
    }

    pub fn to(mut self, state: impl Into<Option<S>>) -> Self {
        self.to = Some(state.into());
        self
    }

    pub fn on(mut self, event: impl Into<String>) -> Self {
        self.on = Some(event.into());
        self
    }
}

impl<S: State> Default for Query<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Target state a guard resolves to when it is selected by an event.
#[derive(Clone)]
pub enum Target<S> {
    Literal(Option<S>),
    Deferred(DeferredState<S>),
}

impl<S: State> Target<S> {
    /// Produce the concrete target, invoking a deferred computation now.
    pub fn resolve(&self) -> Option<S> {
        match self {
            Target::Literal(state) => state.clone(),
            Target::Deferred(compute) => compute(),
        }
    }
}

impl<S: State> fmt::Debug for Target<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Literal(state) => f.debug_tuple("Literal").field(state).finish(),
            Target::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// A single transition rule.
///
/// Guards combine a matcher per dimension (`from`, `to`, `on`) with optional
/// `if`/`unless` predicates evaluated against the entity at matching time.
/// They are immutable once built; cloning shares the predicate closures but
/// copies everything else.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{Guard, GuardOptions, Query};
///
/// let guard = Guard::<(), &str>::new(GuardOptions::new().from("parked").to("idling"))?;
///
/// assert!(guard.matches(&(), &Query::new().from("parked")));
/// assert!(!guard.matches(&(), &Query::new().from("idling")));
/// assert_eq!(guard.known_states(), vec![Some("parked"), Some("idling")]);
/// # Ok::<(), switchyard::core::ConfigError>(())
/// ```
pub struct Guard<T, S> {
    from: Matcher<Option<S>>,
    to: Matcher<Option<S>>,
    on: Matcher<String>,
    when: Option<Predicate<T>>,
    unless: Option<Predicate<T>>,
    target: Option<Target<S>>,
    target_count: usize,
}

impl<T, S: State> Guard<T, S> {
    /// Build a guard, rejecting conflicting positive/negative keys.
    pub fn new(options: GuardOptions<T, S>) -> Result<Self, ConfigError> {
        let keys = options.keys();
        for (first, second) in [
            (OptionKey::From, OptionKey::ExceptFrom),
            (OptionKey::To, OptionKey::ExceptTo),
            (OptionKey::On, OptionKey::ExceptOn),
            (OptionKey::If, OptionKey::Unless),
        ] {
            if keys.contains(&first) && keys.contains(&second) {
                return Err(ConfigError::ConflictingKeys { first, second });
            }
        }

        let (to, target, target_count) = match options.to {
            Some(TargetOption::Values(values)) => {
                let matcher = Matcher::whitelist(values);
                let count = matcher.values().len();
                let target = match matcher.values() {
                    [single] => Some(Target::Literal(single.clone())),
                    _ => None,
                };
                (matcher, target, count)
            }
            // A computed target cannot be enumerated, so any `to` is accepted.
            Some(TargetOption::Deferred(compute)) => {
                (Matcher::All, Some(Target::Deferred(compute)), 1)
            }
            None => match options.except_to {
                Some(values) => (Matcher::blacklist(values), None, 0),
                None => (Matcher::All, None, 0),
            },
        };

        Ok(Guard {
            from: dimension(options.from, options.except_from),
            to,
            on: dimension(options.on, options.except_on),
            when: options.when,
            unless: options.unless,
            target,
            target_count,
        })
    }

    pub fn from_matcher(&self) -> &Matcher<Option<S>> {
        &self.from
    }

    pub fn to_matcher(&self) -> &Matcher<Option<S>> {
        &self.to
    }

    pub fn on_matcher(&self) -> &Matcher<String> {
        &self.on
    }

    /// Configured target, or `None` when the guard leaves the state as is.
    pub fn target(&self) -> Option<&Target<S>> {
        self.target.as_ref()
    }

    /// Number of target values declared with the `to` key.
    pub(crate) fn target_count(&self) -> usize {
        self.target_count
    }

    /// Test the guard against `query`, evaluating predicates on `entity`.
    pub fn matches(&self, entity: &T, query: &Query<S>) -> bool {
        query.from.as_ref().is_none_or(|from| self.from.matches(from))
            && query.to.as_ref().is_none_or(|to| self.to.matches(to))
            && query.on.as_ref().is_none_or(|on| self.on.matches(on))
            && self.when.as_ref().is_none_or(|when| when(entity))
            && self.unless.as_ref().is_none_or(|unless| !unless(entity))
    }

    /// States referenced by the `from` and `to` requirements.
    ///
    /// `from` literals come first, then `to` literals, each in declaration
    /// order with duplicates removed. Event requirements never contribute.
    pub fn known_states(&self) -> Vec<Option<S>> {
        let mut states = Vec::new();
        for state in self.from.values().iter().chain(self.to.values()) {
            push_unique(&mut states, state);
        }
        states
    }
}

impl<T, S: State> Clone for Guard<T, S> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            on: self.on.clone(),
            when: self.when.clone(),
            unless: self.unless.clone(),
            target: self.target.clone(),
            target_count: self.target_count,
        }
    }
}

impl<T, S: State> fmt::Debug for Guard<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("on", &self.on)
            .field("if", &self.when.is_some())
            .field("unless", &self.unless.is_some())
            .field("target", &self.target)
            .finish()
    }
}

fn dimension<V: PartialEq>(only: Option<Vec<V>>, except: Option<Vec<V>>) -> Matcher<V> {
    match (only, except) {
        (Some(values), _) => Matcher::whitelist(values),
        (None, Some(values)) => Matcher::blacklist(values),
        (None, None) => Matcher::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Car {
        moving: bool,
    }

    fn guard(options: GuardOptions<Car, &'static str>) -> Guard<Car, &'static str> {
        Guard::new(options).unwrap()
    }

    fn car() -> Car {
        Car { moving: false }
    }

    #[test]
    fn no_requirements_match_any_query() {
        let guard = guard(GuardOptions::new());

        assert!(guard.matches(&car(), &Query::new()));
        assert!(guard.matches(
            &car(),
            &Query::new().from("parked").to("idling").on("ignite")
        ));
    }

    #[test]
    fn from_requirement() {
        let guard = guard(GuardOptions::new().from("parked"));

        assert!(guard.matches(&car(), &Query::new().to("idling")));
        assert!(guard.matches(&car(), &Query::new().from("parked")));
        assert!(!guard.matches(&car(), &Query::new().from("idling")));
        assert!(!guard.matches(&car(), &Query::new().from(None)));
        assert!(guard.matches(&car(), &Query::new().from("parked").on("ignite")));
        assert_eq!(guard.known_states(), vec![Some("parked")]);
    }

    #[test]
    fn multiple_from_requirements() {
        let guard = guard(GuardOptions::new().from_any(["idling", "parked"]));

        assert!(guard.matches(&car(), &Query::new().from("idling")));
        assert!(!guard.matches(&car(), &Query::new().from("first_gear")));
        assert_eq!(guard.known_states(), vec![Some("idling"), Some("parked")]);
    }

    #[test]
    fn to_requirement() {
        let guard = guard(GuardOptions::new().to("idling"));

        assert!(guard.matches(&car(), &Query::new().from("parked")));
        assert!(guard.matches(&car(), &Query::new().to("idling")));
        assert!(!guard.matches(&car(), &Query::new().to("parked")));
        assert!(!guard.matches(&car(), &Query::new().to(None)));
        assert_eq!(guard.known_states(), vec![Some("idling")]);
    }

    #[test]
    fn on_requirement_contributes_no_states() {
        let guard = guard(GuardOptions::new().on("ignite"));

        assert!(guard.matches(&car(), &Query::new().from("parked")));
        assert!(guard.matches(&car(), &Query::new().on("ignite")));
        assert!(!guard.matches(&car(), &Query::new().on("park")));
        assert!(guard.known_states().is_empty());
    }

    #[test]
    fn except_from_requirement() {
        let guard = guard(GuardOptions::new().except_from("parked"));

        assert!(guard.matches(&car(), &Query::new().from("idling")));
        assert!(!guard.matches(&car(), &Query::new().from("parked")));
        assert!(guard.matches(&car(), &Query::new().from(None)));
        assert_eq!(guard.known_states(), vec![Some("parked")]);
    }

    #[test]
    fn except_to_requirement() {
        let guard = guard(GuardOptions::new().except_to_any(["idling", "parked"]));

        assert!(guard.matches(&car(), &Query::new().to("first_gear")));
        assert!(!guard.matches(&car(), &Query::new().to("idling")));
        assert!(guard.matches(&car(), &Query::new().to(None)));
        assert_eq!(guard.known_states(), vec![Some("idling"), Some("parked")]);
    }

    #[test]
    fn except_on_requirement() {
        let guard = guard(GuardOptions::new().except_on_any(["ignite", "park"]));

        assert!(guard.matches(&car(), &Query::new().on("shift_up")));
        assert!(!guard.matches(&car(), &Query::new().on("ignite")));
        assert!(guard.known_states().is_empty());
    }

    #[test]
    fn conflicting_requirements_are_rejected() {
        let cases = [
            (
                GuardOptions::<Car, &str>::new().from("parked").except_from("parked"),
                OptionKey::From,
                OptionKey::ExceptFrom,
            ),
            (
                GuardOptions::new().to("idling").except_to("parked"),
                OptionKey::To,
                OptionKey::ExceptTo,
            ),
            (
                GuardOptions::new().except_on("park").on("ignite"),
                OptionKey::On,
                OptionKey::ExceptOn,
            ),
            (
                GuardOptions::new().when(|_| true).unless(|_| true),
                OptionKey::If,
                OptionKey::Unless,
            ),
        ];

        for (options, first, second) in cases {
            let error = Guard::new(options).unwrap_err();
            assert_eq!(error, ConfigError::ConflictingKeys { first, second });
        }
    }

    #[test]
    fn different_requirements_must_all_match() {
        let guard = guard(GuardOptions::new().from("parked").to("idling").on("ignite"));

        assert!(guard.matches(&car(), &Query::new()));
        assert!(guard.matches(
            &car(),
            &Query::new().from("parked").to("idling").on("ignite")
        ));
        assert!(!guard.matches(&car(), &Query::new().from("idling")));
        assert!(!guard.matches(&car(), &Query::new().to("parked")));
        assert!(!guard.matches(&car(), &Query::new().on("park")));
        assert_eq!(guard.known_states(), vec![Some("parked"), Some("idling")]);
    }

    #[test]
    fn known_states_are_not_duplicated() {
        let guard = guard(GuardOptions::new().except_from("idling").to("idling").on("ignite"));

        assert_eq!(guard.known_states(), vec![Some("idling")]);
    }

    #[test]
    fn unset_requirements() {
        let guard = guard(GuardOptions::new().from(None).to(None));

        assert!(guard.matches(&car(), &Query::new()));
        assert!(guard.matches(&car(), &Query::new().from(None).to(None)));
        assert!(!guard.matches(&car(), &Query::new().from("parked")));
        assert!(!guard.matches(&car(), &Query::new().to("idling")));
        assert_eq!(guard.known_states(), vec![None]);
    }

    #[test]
    fn if_conditional_is_evaluated_against_entity() {
        let guard = guard(GuardOptions::new().when(|car: &Car| car.moving));

        assert!(!guard.matches(&car(), &Query::new()));
        assert!(guard.matches(&Car { moving: true }, &Query::new()));
    }

    #[test]
    fn unless_conditional_is_evaluated_against_entity() {
        let guard = guard(GuardOptions::new().unless(|car: &Car| car.moving));

        assert!(guard.matches(&car(), &Query::new()));
        assert!(!guard.matches(&Car { moving: true }, &Query::new()));
    }

    #[test]
    fn conditionals_are_skipped_when_states_do_not_match() {
        let guard = guard(
            GuardOptions::new()
                .from("parked")
                .when(|_: &Car| panic!("predicate should not run")),
        );

        assert!(!guard.matches(&car(), &Query::new().from("idling")));
    }

    #[test]
    fn single_literal_target() {
        let guard = guard(GuardOptions::new().to("idling"));

        assert_eq!(guard.target().map(Target::resolve), Some(Some("idling")));
        assert_eq!(guard.target_count(), 1);
    }

    #[test]
    fn multiple_literals_have_no_single_target() {
        let guard = guard(GuardOptions::new().to_any(["idling", "parked"]));

        assert!(guard.target().is_none());
        assert_eq!(guard.target_count(), 2);
    }

    #[test]
    fn deferred_target_accepts_any_to_and_is_not_known() {
        let guard = guard(GuardOptions::new().from("parked").to_with(|| Some("computed")));

        assert!(guard.matches(&car(), &Query::new().to("anything")));
        assert_eq!(guard.known_states(), vec![Some("parked")]);
        assert_eq!(guard.target().map(Target::resolve), Some(Some("computed")));
    }
}
