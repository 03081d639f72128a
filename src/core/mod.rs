//! Core rule-evaluation types.
//!
//! This module contains the pure part of the engine:
//! - State values via the `State` marker trait
//! - Value matchers for each requirement dimension
//! - Guard options, guards and the queries they are matched against
//!
//! Nothing in this module reads or writes an entity's attribute; guards only
//! evaluate the predicates they were configured with.

mod error;
mod guard;
mod matcher;
mod options;
mod state;

pub use error::ConfigError;
pub use guard::{Guard, Query, Target};
pub use matcher::Matcher;
pub use options::{DeferredState, GuardOptions, OptionKey, Predicate};
pub use state::State;

pub(crate) use state::{describe, push_unique};
