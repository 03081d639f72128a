//! Requirement options used to declare guards and callback filters.

use crate::core::error::ConfigError;
use crate::core::state::State;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Predicate evaluated against the entity when a guard is matched.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Zero-argument computation producing a target state at resolution time.
pub type DeferredState<S> = Arc<dyn Fn() -> Option<S> + Send + Sync>;

/// Recognized option keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionKey {
    To,
    From,
    ExceptTo,
    ExceptFrom,
    On,
    ExceptOn,
    If,
    Unless,
}

impl OptionKey {
    pub const ALL: [OptionKey; 8] = [
        OptionKey::To,
        OptionKey::From,
        OptionKey::ExceptTo,
        OptionKey::ExceptFrom,
        OptionKey::On,
        OptionKey::ExceptOn,
        OptionKey::If,
        OptionKey::Unless,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::To => "to",
            OptionKey::From => "from",
            OptionKey::ExceptTo => "except_to",
            OptionKey::ExceptFrom => "except_from",
            OptionKey::On => "on",
            OptionKey::ExceptOn => "except_on",
            OptionKey::If => "if",
            OptionKey::Unless => "unless",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::UnrecognizedOptions {
                keys: vec![s.to_string()],
            })
    }
}

/// Value supplied for the `to` key.
pub(crate) enum TargetOption<S> {
    Values(Vec<Option<S>>),
    Deferred(DeferredState<S>),
}

/// Builder for the options of a single guard.
///
/// Every setter records its key so that conflicts and keys a context does
/// not accept can be reported by name. Setting the same key twice keeps the
/// last value.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{GuardOptions, OptionKey};
///
/// struct Vehicle {
///     seatbelt_on: bool,
/// }
///
/// let options = GuardOptions::<Vehicle, &str>::new()
///     .from("parked")
///     .to("idling")
///     .when(|vehicle: &Vehicle| vehicle.seatbelt_on);
///
/// assert_eq!(options.keys(), &[OptionKey::From, OptionKey::To, OptionKey::If]);
/// ```
pub struct GuardOptions<T, S> {
    keys: Vec<OptionKey>,
    pub(crate) to: Option<TargetOption<S>>,
    pub(crate) from: Option<Vec<Option<S>>>,
    pub(crate) except_to: Option<Vec<Option<S>>>,
    pub(crate) except_from: Option<Vec<Option<S>>>,
    pub(crate) on: Option<Vec<String>>,
    pub(crate) except_on: Option<Vec<String>>,
    pub(crate) when: Option<Predicate<T>>,
    pub(crate) unless: Option<Predicate<T>>,
}

impl<T, S: State> GuardOptions<T, S> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            to: None,
            from: None,
            except_to: None,
            except_from: None,
            on: None,
            except_on: None,
            when: None,
            unless: None,
        }
    }

    /// Keys supplied so far, in first-seen order.
    pub fn keys(&self) -> &[OptionKey] {
        &self.keys
    }

    /// Fail with `UnrecognizedOptions` if any supplied key is not in `allowed`.
    pub fn assert_valid_keys(&self, allowed: &[OptionKey]) -> Result<(), ConfigError> {
        let invalid: Vec<String> = self
            .keys
            .iter()
            .filter(|key| !allowed.contains(key))
            .map(|key| key.to_string())
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::UnrecognizedOptions { keys: invalid })
        }
    }

    fn record(&mut self, key: OptionKey) {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn to(self, state: impl Into<Option<S>>) -> Self {
        self.to_any([state.into()])
    }

    pub fn to_any<I>(mut self, states: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<S>>,
    {
        self.record(OptionKey::To);
        self.to = Some(TargetOption::Values(collect_states(states)));
        self
    }

    /// Target computed each time the guard is resolved into a transition.
    pub fn to_with<F>(mut self, target: F) -> Self
    where
        F: Fn() -> Option<S> + Send + Sync + 'static,
    {
        self.record(OptionKey::To);
        self.to = Some(TargetOption::Deferred(Arc::new(target)));
        self
    }

    pub fn from(self, state: impl Into<Option<S>>) -> Self {
        self.from_any([state.into()])
    }

    pub fn from_any<I>(mut self, states: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<S>>,
    {
        self.record(OptionKey::From);
        self.from = Some(collect_states(states));
        self
    }

    pub fn except_to(self, state: impl Into<Option<S>>) -> Self {
        self.except_to_any([state.into()])
    }

    pub fn except_to_any<I>(mut self, states: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<S>>,
    {
        self.record(OptionKey::ExceptTo);
        self.except_to = Some(collect_states(states));
        self
    }

    pub fn except_from(self, state: impl Into<Option<S>>) -> Self {
        self.except_from_any([state.into()])
    }

    pub fn except_from_any<I>(mut self, states: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<S>>,
    {
        self.record(OptionKey::ExceptFrom);
        self.except_from = Some(collect_states(states));
        self
    }

    pub fn on(self, event: impl Into<String>) -> Self {
        self.on_any([event.into()])
    }

    pub fn on_any<I>(mut self, events: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.record(OptionKey::On);
        self.on = Some(events.into_iter().map(Into::into).collect());
        self
    }

    pub fn except_on(self, event: impl Into<String>) -> Self {
        self.except_on_any([event.into()])
    }

    pub fn except_on_any<I>(mut self, events: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.record(OptionKey::ExceptOn);
        self.except_on = Some(events.into_iter().map(Into::into).collect());
        self
    }

    /// Only match when `predicate` holds for the entity (the `if` key).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.record(OptionKey::If);
        self.when = Some(Arc::new(predicate));
        self
    }

    /// Only match when `predicate` does not hold for the entity.
    pub fn unless<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.record(OptionKey::Unless);
        self.unless = Some(Arc::new(predicate));
        self
    }
}

impl<T, S: State> Default for GuardOptions<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_states<S, I>(states: I) -> Vec<Option<S>>
where
    I: IntoIterator,
    I::Item: Into<Option<S>>,
{
    states.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_from_strings() {
        assert_eq!("except_from".parse::<OptionKey>(), Ok(OptionKey::ExceptFrom));
        assert_eq!("if".parse::<OptionKey>(), Ok(OptionKey::If));
    }

    #[test]
    fn unknown_key_is_unrecognized() {
        let error = "invalid".parse::<OptionKey>().unwrap_err();

        assert_eq!(error.to_string(), "Invalid key(s): invalid");
    }

    #[test]
    fn keys_are_recorded_once_in_first_seen_order() {
        let options = GuardOptions::<(), &str>::new()
            .to("idling")
            .from("parked")
            .to("first_gear");

        assert_eq!(options.keys(), &[OptionKey::To, OptionKey::From]);
    }

    #[test]
    fn assert_valid_keys_names_every_offender() {
        let options = GuardOptions::<(), &str>::new()
            .on("ignite")
            .from("parked")
            .except_to("idling");

        let error = options
            .assert_valid_keys(&[OptionKey::From, OptionKey::To])
            .unwrap_err();

        assert_eq!(
            error,
            ConfigError::UnrecognizedOptions {
                keys: vec!["on".to_string(), "except_to".to_string()],
            }
        );
    }

    #[test]
    fn single_and_multiple_values_share_a_form() {
        let single = GuardOptions::<(), &str>::new().from("parked");
        let multiple = GuardOptions::<(), &str>::new().from_any(["parked"]);

        assert_eq!(single.from, multiple.from);
    }

    #[test]
    fn unset_marker_is_accepted() {
        let options = GuardOptions::<(), &str>::new().from(None);

        assert_eq!(options.from, Some(vec![None]));
    }
}
