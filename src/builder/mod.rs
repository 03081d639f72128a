//! Builder API for declaring machines.
//!
//! This module provides the fluent [`MachineBuilder`] used during a machine's
//! setup phase, plus shorthands for the most common declarations.

pub mod machine;

pub use crate::core::ConfigError;
pub use machine::MachineBuilder;

use crate::core::{GuardOptions, State};

/// Options for an unconditional transition from `from` to `to`.
///
/// # Example
///
/// ```
/// use switchyard::builder::simple_transition;
/// use switchyard::core::OptionKey;
///
/// let options = simple_transition::<(), _>("parked", "idling");
/// assert_eq!(options.keys(), &[OptionKey::From, OptionKey::To]);
/// ```
pub fn simple_transition<T, S: State>(from: S, to: S) -> GuardOptions<T, S> {
    GuardOptions::new().from(from).to(to)
}

/// Options for a transition from `from` to `to` that only applies while
/// `guard` holds for the entity.
pub fn guarded_transition<T, S, F>(from: S, to: S, guard: F) -> GuardOptions<T, S>
where
    S: State,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    simple_transition(from, to).when(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{Machine, MachineOptions};

    struct Task {
        state: Option<&'static str>,
        ready: bool,
    }

    fn machine() -> Machine<Task, &'static str> {
        Machine::configure("state", MachineOptions::new().initial("pending"))
            .reader(|task: &Task| task.state)
            .writer(|task: &mut Task, state| task.state = state)
            .event("start", |event| {
                event.transition(guarded_transition("pending", "running", |task: &Task| {
                    task.ready
                }))?;
                Ok(())
            })
            .unwrap()
            .event("finish", |event| {
                event.transition(simple_transition("running", "done"))?;
                Ok(())
            })
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn simple_transition_builds() {
        let machine = machine();
        let mut task = Task {
            state: Some("running"),
            ready: false,
        };

        assert!(machine.fire(&mut task, "finish", &()).unwrap());
        assert_eq!(task.state, Some("done"));
    }

    #[test]
    fn guarded_transition_respects_guard() {
        let machine = machine();
        let mut waiting = Task {
            state: Some("pending"),
            ready: false,
        };
        let ready = Task {
            state: Some("pending"),
            ready: true,
        };

        assert!(!machine.can_fire(&waiting, "start").unwrap());
        assert!(machine.can_fire(&ready, "start").unwrap());
        assert!(!machine.fire(&mut waiting, "start", &()).unwrap());
        assert_eq!(waiting.state, Some("pending"));
    }
}
