//! Declarative machine definitions loaded from JSON.
//!
//! A definition carries everything about a machine that can be expressed as
//! data: the attribute, initial state, action name, extra states and the
//! events with their state requirements.
//!
//! ```json
//! {
//!   "attribute": "state",
//!   "initial": "parked",
//!   "action": "save",
//!   "other_states": ["stalled"],
//!   "events": [
//!     {"name": "ignite", "transitions": [{"from": "parked", "to": "idling"}]},
//!     {"name": "park", "transitions": [{"except_from": ["parked", null], "to": "parked"}]}
//!   ]
//! }
//! ```
//!
//! Requirement values may be a single literal, `null` (the unset marker) or
//! an array of either. Conditionals (`if`/`unless`) have no data form and
//! are rejected; register predicates on the builder instead.

use crate::builder::MachineBuilder;
use crate::core::{ConfigError, GuardOptions, OptionKey, State};
use crate::machine::MachineOptions;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Serializable description of a machine.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(bound(deserialize = "S: Deserialize<'de>"))]
pub struct MachineDefinition<S> {
    pub attribute: String,

    #[serde(default)]
    pub initial: Option<S>,

    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub other_states: Vec<Option<S>>,

    #[serde(default)]
    pub events: Vec<EventDefinition>,
}

/// An event and the raw options of each of its transitions.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EventDefinition {
    pub name: String,

    #[serde(default)]
    pub transitions: Vec<Map<String, Value>>,
}

impl<S: State + DeserializeOwned> MachineDefinition<S> {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    pub fn options(&self) -> MachineOptions<S> {
        MachineOptions {
            initial: self.initial.clone(),
            action: self.action.clone(),
        }
    }

    /// Turn the definition into a builder ready for hooks and callbacks.
    ///
    /// Every transition is checked; all failures are reported together in
    /// [`ConfigError::Invalid`], each wrapped with its event and position.
    pub fn into_builder<T, A>(self) -> Result<MachineBuilder<T, S, A>, ConfigError> {
        let options = self.options();
        let mut builder =
            MachineBuilder::new(self.attribute, options).other_states(self.other_states);
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = Vec::new();

        for EventDefinition { name, transitions } in self.events {
            builder = builder.event(&name, |event| {
                for (index, raw) in transitions.iter().enumerate() {
                    let declared = transition_options(raw)
                        .and_then(|options| event.transition(options).map(|_| ()));
                    checks.push(match declared {
                        Ok(()) => Validation::success(()),
                        Err(error) => Validation::fail(ConfigError::InEvent {
                            event: name.clone(),
                            index,
                            error: Box::new(error),
                        }),
                    });
                }
                Ok(())
            })?;
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(builder),
            Validation::Failure(errors) => Err(ConfigError::Invalid(errors.iter().cloned().collect())),
        }
    }
}

/// Convert one raw transition object into guard options.
pub fn transition_options<T, S>(raw: &Map<String, Value>) -> Result<GuardOptions<T, S>, ConfigError>
where
    S: State + DeserializeOwned,
{
    let unknown: Vec<String> = raw
        .keys()
        .filter(|key| key.parse::<OptionKey>().is_err())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ConfigError::UnrecognizedOptions { keys: unknown });
    }

    let mut options = GuardOptions::new();
    for (key, value) in raw {
        let key: OptionKey = key.parse()?;
        options = match key {
            OptionKey::To => options.to_any(states::<S>(key, value)?),
            OptionKey::From => options.from_any(states::<S>(key, value)?),
            OptionKey::ExceptTo => options.except_to_any(states::<S>(key, value)?),
            OptionKey::ExceptFrom => options.except_from_any(states::<S>(key, value)?),
            OptionKey::On => options.on_any(names(key, value)?),
            OptionKey::ExceptOn => options.except_on_any(names(key, value)?),
            OptionKey::If | OptionKey::Unless => {
                return Err(ConfigError::ExpressionConditional { key })
            }
        };
    }
    Ok(options)
}

fn literals(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        single => vec![single.clone()],
    }
}

fn states<S: DeserializeOwned>(key: OptionKey, value: &Value) -> Result<Vec<Option<S>>, ConfigError> {
    literals(value)
        .into_iter()
        .map(|literal| serde_json::from_value::<Option<S>>(literal).map_err(|e| invalid(key, e)))
        .collect()
}

fn names(key: OptionKey, value: &Value) -> Result<Vec<String>, ConfigError> {
    literals(value)
        .into_iter()
        .map(|literal| serde_json::from_value::<String>(literal).map_err(|e| invalid(key, e)))
        .collect()
}

fn invalid(key: OptionKey, error: serde_json::Error) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: error.to_string(),
    }
}
