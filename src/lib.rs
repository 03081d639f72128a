//! Switchyard: attribute state machines for host entities
//!
//! Switchyard attaches declarative state machines to an attribute of any
//! host type. A machine names its events, the transitions each event may
//! perform, and the callbacks that run around those transitions; firing an
//! event reads the attribute, picks the first matching transition, runs the
//! callbacks, writes the new value and invokes the host's action.
//!
//! # Core Concepts
//!
//! - **State**: any cloneable, comparable value via the `State` marker trait
//! - **Guards**: requirement matchers over from/to/event plus predicates
//! - **Events**: ordered guards under one name; the first match wins
//! - **Transitions**: one-shot attempts with before/after callbacks
//! - **Definitions**: machines declared as JSON data
//!
//! # Example
//!
//! ```rust
//! use switchyard::{GuardOptions, Machine, MachineOptions};
//!
//! struct Vehicle {
//!     state: Option<&'static str>,
//! }
//!
//! let machine: Machine<Vehicle, &str> =
//!     Machine::configure("state", MachineOptions::new().initial("parked"))
//!         .reader(|vehicle: &Vehicle| vehicle.state)
//!         .writer(|vehicle: &mut Vehicle, state| vehicle.state = state)
//!         .event("ignite", |event| {
//!             event.transition(GuardOptions::new().from("parked").to("idling"))?;
//!             Ok(())
//!         })?
//!         .build()?;
//!
//! let mut vehicle = Vehicle { state: None };
//! machine.initialize(&mut vehicle);
//! assert_eq!(vehicle.state, Some("parked"));
//!
//! assert!(machine.fire(&mut vehicle, "ignite", &())?);
//! assert_eq!(vehicle.state, Some("idling"));
//! assert!(!machine.fire(&mut vehicle, "ignite", &())?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod core;
pub mod definition;
pub mod machine;

// Re-export commonly used types
pub use builder::MachineBuilder;
pub use core::{ConfigError, Guard, GuardOptions, Matcher, OptionKey, Query, State};
pub use definition::MachineDefinition;
pub use machine::{Event, Machine, MachineError, MachineOptions, Subject, Transition, TransitionObserver};
