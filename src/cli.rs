//! CLI arguments and subcommands for proctable.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;

/// Log level options for CLI parsing and config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Maximum tracing level, or `None` when logging is off.
    pub fn max_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Snapshot output formats
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "proctable",
    about = "Snapshot the process table with parent/child links and app ownership",
    long_about = "Snapshot the process table with parent/child links and app ownership.\n\n\
                  Reads every per-process status record under the proc root, normalizes \
                  memory to bytes and CPU time to seconds, and tags the processes that \
                  belong to the monitored application.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level [default: config file log_level, else warn]
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Root of the kernel process listing
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Case-insensitive command-name marker of the monitored application
    #[arg(short = 'm', long)]
    pub app_marker: Option<String>,

    /// Override page size in bytes
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Override clock ticks per second
    #[arg(long)]
    pub ticks_per_second: Option<f64>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take one snapshot and print every process
    Snapshot {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show processes owned by the monitored application
        #[arg(long)]
        owned_only: bool,
    },

    /// Print the process forest with per-tree usage
    Tree {
        /// Only print the subtree rooted at this pid
        #[arg(short = 'p', long)]
        pid: Option<u32>,
    },

    /// Validate that process records can be read and parsed
    Check,
}
