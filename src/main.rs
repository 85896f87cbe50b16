//! Showstate runner
//!
//! Reads control words and condition events from stdin, one per line, and
//! writes `state <name>` and `action <tokens>` lines to stdout. Logs go to
//! stderr.

use anyhow::{Context, Result};
use clap::Parser;
use showstate::config::Settings;
use showstate::installation;
use showstate::machine::{StateMachine, WriterSink};
use showstate::protocol::Command;
use std::io::{self, BufRead, Stdout};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Showstate - condition-driven state machine for show control
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the states and conditions tables
    #[arg(short, long, default_value = "sm")]
    dir: PathBuf,

    /// Optional JSON settings file
    #[arg(short, long, env = "SHOWSTATE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Installation whose resolvers drive the machine
    #[arg(short, long, default_value = "retrieval")]
    installation: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,

    /// Initialize the machine before reading input
    #[arg(long)]
    init: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    let settings = match &args.settings {
        Some(path) => Settings::from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let resolvers = installation::by_name(&args.installation).with_context(|| {
        format!(
            "Unknown installation '{}'. Available: {}",
            args.installation,
            installation::INSTALLATIONS.join(", ")
        )
    })?;

    let mut machine =
        StateMachine::new(settings, WriterSink::new(io::stdout())).with_resolvers(resolvers);
    machine
        .load_dir(&args.dir)
        .with_context(|| format!("Failed to load state machine from {}", args.dir.display()))?;
    info!(
        "Loaded {} states from {}",
        machine.state_names().count(),
        args.dir.display()
    );

    if args.check {
        info!("Configuration OK");
        return Ok(());
    }
    if args.init {
        machine.init()?;
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Ok(command) => {
                if let Err(e) = dispatch(&mut machine, command) {
                    error!("{:#}", e);
                }
            }
            Err(e) => warn!("Ignoring '{}': {}", line.trim(), e),
        }
    }

    info!("Input closed, shutting down");
    Ok(())
}

fn dispatch(machine: &mut StateMachine<WriterSink<Stdout>>, command: Command) -> Result<()> {
    match command {
        Command::Init => machine.init()?,
        Command::Reset => machine.reset(),
        Command::Ping => println!("pong"),
        Command::Conditions => info!("Conditions:\n{}", machine.dump_conditions()?),
        Command::States => info!(
            "States: {}",
            machine.state_names().collect::<Vec<_>>().join(", ")
        ),
        Command::Event {
            channel,
            index,
            value,
        } => {
            let outcome = machine.handle_event(&channel, index, value)?;
            info!("Now in state '{}'", outcome.state());
        }
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();

    Ok(())
}
