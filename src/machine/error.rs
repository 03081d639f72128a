//! Errors raised while operating a configured machine.

use thiserror::Error;

/// Run-time errors. Callback and predicate panics are never converted.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    #[error("Cannot transition {attribute} via :{event} from {from}")]
    InvalidTransition {
        attribute: String,
        event: String,
        from: String,
    },

    #[error("{state} is an invalid {attribute}")]
    UnknownState { attribute: String, state: String },

    #[error("No event named :{event} is defined for {attribute}")]
    UnknownEvent { attribute: String, event: String },
}
