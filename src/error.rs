//! Error types for process table construction.
//!
//! Every per-process failure is contained by the table builder; only an
//! unreadable process directory cuts a build short.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Errors raised while enumerating or decoding process status records.
#[derive(Debug, thiserror::Error)]
pub enum ProcError {
    #[error("process directory {} unavailable: {source}", .path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("status record for pid {pid} unreadable: {source}")]
    RecordUnreadable {
        pid: u32,
        /// False when the record could not even be opened (process exited).
        opened: bool,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed status record for pid {pid}: {reason}")]
    MalformedRecord { pid: u32, reason: String },
}

impl ProcError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProcError::DirectoryUnavailable { .. } => FailureKind::DirectoryUnavailable,
            ProcError::RecordUnreadable { .. } => FailureKind::RecordUnreadable,
            ProcError::MalformedRecord { .. } => FailureKind::MalformedRecord,
        }
    }

    /// Builds a `MalformedRecord` without a pid; the source fills it in.
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ProcError::MalformedRecord {
            pid: 0,
            reason: reason.into(),
        }
    }

    /// Attaches the pid to a record-level error raised by a pure decoder.
    pub(crate) fn with_pid(self, pid: u32) -> Self {
        match self {
            ProcError::RecordUnreadable { opened, source, .. } => ProcError::RecordUnreadable {
                pid,
                opened,
                source,
            },
            ProcError::MalformedRecord { reason, .. } => ProcError::MalformedRecord { pid, reason },
            other => other,
        }
    }
}

/// Coarse failure classification reported by a build (last one wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DirectoryUnavailable,
    RecordUnreadable,
    MalformedRecord,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::DirectoryUnavailable => "directory unavailable",
            FailureKind::RecordUnreadable => "record unreadable",
            FailureKind::MalformedRecord => "malformed record",
        };
        f.write_str(s)
    }
}
