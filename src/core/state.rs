//! State values held by a machine's attribute.
//!
//! Any cloneable, comparable, debuggable value can be a state: symbolic
//! names (`&'static str`, `String`, a plain enum) as well as data such as
//! timestamps produced by a deferred target. An attribute that has never
//! been written reads as `None`, and `None` is also the explicit "no value"
//! marker a requirement may list.

use std::fmt::Debug;

/// Marker trait for values stored in a state machine attribute.
///
/// Implemented for every type that satisfies the bounds, so hosts never
/// implement it by hand.
///
/// # Example
///
/// ```rust
/// use switchyard::core::State;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Gear {
///     Parked,
///     Idling,
/// }
///
/// fn assert_state<S: State>() {}
/// assert_state::<Gear>();
/// assert_state::<&'static str>();
/// ```
pub trait State: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<S> State for S where S: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// Render an attribute value for error messages and log fields.
pub(crate) fn describe<S: State>(value: &Option<S>) -> String {
    match value {
        Some(state) => format!("{state:?}"),
        None => "nil".to_string(),
    }
}

/// Append `value` to `states` unless an equal value is already present.
pub(crate) fn push_unique<S: State>(states: &mut Vec<Option<S>>, value: &Option<S>) {
    if !states.contains(value) {
        states.push(value.clone());
    }
}
