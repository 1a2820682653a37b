//! Process-related modules for building process table snapshots.
//!
//! This module provides:
//! - `stat`: Parser for Linux `/proc/<pid>/stat` lines
//! - `psinfo`: Decoders for Solaris/illumos binary status records
//! - `units`: Page, tick and KB conversion to bytes and seconds
//! - `classifier`: Monitored-application and priority classification
//! - `source`: Per-process status sources for both record layouts
//! - `scanner`: Process discovery and table building
//! - `table`: Normalized entries, parent/child linking and tree queries

pub mod classifier;
pub mod psinfo;
pub mod scanner;
pub mod source;
pub mod stat;
pub mod table;
pub mod units;

// Re-export commonly used types
pub use classifier::{
    is_low_priority, OwnershipClassifier, DEFAULT_APP_MARKER, LOW_PRIORITY_SENTINEL,
};
pub use psinfo::{PrUsage, PsInfo, PSINFO_RECORD_LEN, USAGE_RECORD_LEN};
pub use scanner::{
    build_snapshot, collect_proc_entries, native_source, BuildReport, ProcEntry, SnapshotOptions,
    TableBuilder, DEFAULT_PROC_ROOT,
};
pub use source::{NativeSource, PsinfoSource, StatFileSource, StatusSource};
pub use stat::{parse_stat_line, ProcStat, STAT_FIELD_COUNT};
pub use table::{link_children, ProcessInfo, ProcessTable, ResourceUsage, MAX_COMMAND_LEN};
pub use units::Units;
