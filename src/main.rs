//! proctable - version 0.1.0
//!
//! Process table snapshots with tracing logging.
//! This is the main entry point that resolves configuration and dispatches subcommands.

mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Args, Commands, LogLevel, OutputFormat};
use commands::{command_check, command_snapshot, command_tree};
use config::{resolve_config, show_config, validate_effective_config};

/// Installs the stderr tracing subscriber at the resolved level.
fn setup_logging(level: LogLevel) {
    let Some(max_level) = level.max_level() else {
        return;
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
        return;
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Main application entry point.
fn main() -> Result<()> {
    let args = Args::parse();

    // The log level may come from the config file, so resolve it first.
    let config = resolve_config(&args)?;
    setup_logging(config.log_level());

    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {:#}", e);
        std::process::exit(1);
    }
    if args.check_config {
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if args.show_config {
        return show_config(&config.effective(), args.config_format.clone());
    }

    let opts = config.snapshot_options();

    match &args.command {
        Some(Commands::Snapshot { format, owned_only }) => {
            command_snapshot(&opts, *format, *owned_only)
        }
        Some(Commands::Tree { pid }) => command_tree(&opts, *pid),
        Some(Commands::Check) => command_check(&opts),
        None => command_snapshot(&opts, OutputFormat::Text, false),
    }
}
