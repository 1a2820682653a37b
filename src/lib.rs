//! Process table snapshots for resource monitoring.
//!
//! This library enumerates the processes visible under a proc root, decodes
//! their status records, normalizes memory to bytes and CPU time to seconds,
//! links parents to children, and tags the processes that belong to a
//! monitored application family.
//!
//! # Features
//!
//! - **Two record layouts**: Linux text `stat` lines and Solaris/illumos
//!   binary `psinfo`/`usage` records, selected at compile time
//! - **Partial results**: a bad record skips one process, never the snapshot
//! - **Tree queries**: roots, descendants and aggregated usage per tree
//!
//! # Usage
//!
//! ```rust,no_run
//! use proctable::{build_snapshot, SnapshotOptions};
//!
//! let report = build_snapshot(&SnapshotOptions::default());
//! if let Some(kind) = report.last_failure {
//!     eprintln!("some records were skipped: {}", kind);
//! }
//!
//! for pid in report.table.roots() {
//!     let usage = report.table.tree_usage(pid);
//!     println!("{}: {} processes, {:.1}s cpu", pid, usage.processes, usage.cpu_time());
//! }
//!
//! let owned = report.table.owned_usage();
//! println!("monitored app uses {} bytes resident", owned.working_set_size);
//! ```

pub mod error;
pub mod process;

// Re-export main types for convenience
pub use error::{FailureKind, ProcError};
pub use process::{
    build_snapshot, BuildReport, OwnershipClassifier, ProcessInfo, ProcessTable, ResourceUsage,
    SnapshotOptions, StatusSource, TableBuilder, Units,
};
