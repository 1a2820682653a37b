//! CLI command implementations for proctable.
//!
//! This module provides implementations for all CLI subcommands:
//! - `snapshot`: One process table snapshot, flat
//! - `tree`: The process forest with per-tree usage
//! - `check`: Proc root and record validation

pub mod check;
pub mod snapshot;
pub mod tree;

// Re-export command functions
pub use check::command_check;
pub use snapshot::command_snapshot;
pub use tree::command_tree;

/// Formats bytes as a human-readable size.
pub(crate) fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
