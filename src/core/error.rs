//! Configuration errors raised while declaring guards, events and machines.

use crate::core::options::OptionKey;
use thiserror::Error;

/// Errors detected eagerly during setup, never while firing events.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid key(s): {}", .keys.join(", "))]
    UnrecognizedOptions { keys: Vec<String> },

    #[error("Conflicting keys: {first}, {second}")]
    ConflictingKeys { first: OptionKey, second: OptionKey },

    #[error("Transition declares {count} target states; an event transition needs exactly one")]
    AmbiguousTarget { count: usize },

    #[error("Conditional `{key}` cannot be declared as a string; register a predicate in code")]
    ExpressionConditional { key: OptionKey },

    #[error("Invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Event `{event}` transition {index}: {error}")]
    InEvent {
        event: String,
        index: usize,
        error: Box<ConfigError>,
    },

    #[error("Malformed machine definition: {0}")]
    Malformed(String),

    #[error("Event `{name}` is not defined")]
    UndefinedEvent { name: String },

    #[error("Attribute reader not specified. Call .reader(fn) before .build()")]
    MissingReader,

    #[error("Attribute writer not specified. Call .writer(fn) before .build()")]
    MissingWriter,

    #[error("Action `{action}` configured without an action hook. Call .action_hook(fn)")]
    MissingActionHook { action: String },

    #[error("Invalid machine definition: {}", describe_all(.0))]
    Invalid(Vec<ConfigError>),
}

fn describe_all(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
