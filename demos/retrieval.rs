//! Retrieval Installation
//!
//! This demo drives the retrieval installation through a full visit using
//! the tables in `demos/retrieval/`.
//!
//! Key concepts:
//! - Loading a machine directory (states and conditions tables)
//! - Installation resolvers selected by name
//! - Recording emitted actions and state announcements
//! - The transition journal
//!
//! Run with: cargo run --example retrieval

use showstate::config::Settings;
use showstate::core::Emission;
use showstate::installation;
use showstate::machine::{RecordingSink, StateMachine};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Retrieval Installation ===\n");

    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/retrieval");
    let mut machine = StateMachine::new(Settings::default(), RecordingSink::new())
        .with_resolvers(installation::retrieval::resolvers());
    machine.load_dir(&dir)?;

    println!("States: {}", machine.state_names().collect::<Vec<_>>().join(", "));
    machine.init()?;
    print_emissions(&mut machine);

    // A visitor picks the first retrieval and places one object, which
    // sends them back to idle. They pick it again, place the second object
    // and the exit video reports back.
    let events = [
        ("/retrieval", 0, 1.0),
        ("/video/object", 0, 1.0),
        ("/retrieval", 0, 0.0),
        ("/retrieval", 0, 1.0),
        ("/video/object", 1, 1.0),
        ("/video", 0, 1.0),
    ];

    for (channel, index, value) in events {
        println!("\n> {} [{}] = {}", channel, index, value);
        let outcome = machine.handle_event(channel, index, value)?;
        println!("  now in '{}'", outcome.state());
        print_emissions(&mut machine);
    }

    println!("\nPath: {}", machine.journal().path().join(" -> "));
    println!("Conditions:\n{}", machine.dump_conditions()?);
    Ok(())
}

fn print_emissions(machine: &mut StateMachine<RecordingSink>) {
    for emission in machine.sink_mut().take() {
        match emission {
            Emission::Announce(state) => println!("  state  {}", state),
            Emission::Action(action) => println!("  action {}", action),
        }
    }
}
