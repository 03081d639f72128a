//! The transition engine around the pure core.
//!
//! # Key Concepts
//!
//! - **Events**: ordered guards under one name; the first match wins
//! - **Transitions**: one-shot attempts that run callbacks, write the
//!   attribute and invoke the host action
//! - **Machine**: owns an attribute's events, callbacks, hooks and known states
//!
//! Everything here runs synchronously on the calling thread. Predicates,
//! callbacks and hooks are invoked inline; a panic inside any of them
//! unwinds through `fire` and leaves the entity as it was at that point.

mod callback;
mod error;
mod event;
#[allow(clippy::module_inception)]
mod machine;
mod subject;
mod transition;

pub use callback::{Callback, CallbackFn, Callbacks, TransitionObserver};
pub use error::MachineError;
pub use event::Event;
pub use machine::{
    ActionHook, Machine, MachineOptions, Reader, TransactionHook, Writer,
};
pub use subject::Subject;
pub use transition::Transition;
