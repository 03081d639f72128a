//! Vehicle State Machine
//!
//! This demo drives a vehicle through ignition, gear shifts and a crash.
//!
//! Key concepts:
//! - Guards with from/to requirements and entity predicates
//! - Before/after callbacks filtered by state and event
//! - An action hook deciding the transition result
//! - Loading the same events from a JSON definition
//!
//! Run with: RUST_LOG=switchyard=debug cargo run --example vehicle

use switchyard::{GuardOptions, Machine, MachineDefinition, MachineOptions};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Default)]
struct Vehicle {
    state: Option<String>,
    seatbelt_on: bool,
    odometer: u32,
}

const DEFINITION: &str = r#"{
    "attribute": "state",
    "initial": "parked",
    "action": "save",
    "other_states": ["towed"],
    "events": [
        {"name": "ignite", "transitions": [{"from": "parked", "to": "idling"}]},
        {"name": "shift_up", "transitions": [
            {"from": "idling", "to": "first_gear"},
            {"from": "first_gear", "to": "second_gear"}
        ]},
        {"name": "crash", "transitions": [{"except_from": ["parked", "stalled", null], "to": "stalled"}]},
        {"name": "tow", "transitions": [{"from": "stalled", "to": "towed"}]}
    ]
}"#;

fn init_log() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_log();
    println!("=== Vehicle State Machine ===\n");

    let machine: Machine<Vehicle, String> = MachineDefinition::<String>::from_json(DEFINITION)?
        .into_builder()?
        .reader(|vehicle: &Vehicle| vehicle.state.clone())
        .writer(|vehicle: &mut Vehicle, state| vehicle.state = state)
        .action_hook(|vehicle: &mut Vehicle, action, _args: &()| {
            info!(action, state = ?vehicle.state, "saving vehicle");
            true
        })
        .event("shift_up", |event| {
            event.transition(
                GuardOptions::new()
                    .from("second_gear".to_string())
                    .to("third_gear".to_string())
                    .when(|vehicle: &Vehicle| vehicle.odometer > 0),
            )?;
            Ok(())
        })?
        .before_transition(
            GuardOptions::new().from("parked".to_string()),
            |vehicle: &mut Vehicle, _| {
                vehicle.seatbelt_on = true;
                true
            },
        )?
        .after_transition(GuardOptions::new().on("shift_up"), |vehicle: &mut Vehicle, _| {
            vehicle.odometer += 1;
            true
        })?
        .build()?;

    println!("Known states: {:?}\n", machine.known_states());

    let mut vehicle = Vehicle::default();
    machine.initialize(&mut vehicle);
    println!("Initial state: {:?}", vehicle.state);

    for event in ["ignite", "ignite", "shift_up", "shift_up", "shift_up", "crash", "tow"] {
        let fired = machine.fire(&mut vehicle, event, &())?;
        println!(
            "  {event:<9} -> {:<5} state={:?} seatbelt={} odometer={}",
            fired, vehicle.state, vehicle.seatbelt_on, vehicle.odometer
        );
    }

    if let Err(error) = machine.fire_strict(&mut vehicle, "ignite", &()) {
        println!("\nStrict fire failed: {error}");
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
