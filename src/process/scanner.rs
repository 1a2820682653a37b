//! Process scanning: discover process directories and build a snapshot table.
//!
//! Every numeric entry of the proc root is a candidate process. Each one is
//! read through a `StatusSource`; failures for a single process never stop
//! the scan.

use crate::error::{FailureKind, ProcError};
use crate::process::classifier::{OwnershipClassifier, DEFAULT_APP_MARKER};
use crate::process::source::{NativeSource, StatusSource};
use crate::process::table::{link_children, ProcessTable};
use crate::process::units::Units;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default location of the kernel process listing.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Process entry representing a directory in the proc root.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Scans the proc root for entries with numeric names.
///
/// Non-numeric names (`self`, `meminfo`, ...) are skipped silently.
pub fn collect_proc_entries(root: &Path) -> Result<Vec<ProcEntry>, ProcError> {
    let entries = fs::read_dir(root).map_err(|source| ProcError::DirectoryUnavailable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let p = entry.path();
        let name = match p.file_name().and_then(|s| s.to_str()) {
            Some(v) => v,
            None => continue,
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let pid: u32 = match name.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        out.push(ProcEntry { pid, proc_path: p });
    }
    Ok(out)
}

/// Outcome of one build: the linked table plus the last failure seen.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub table: ProcessTable,
    /// Informational only; the table holds every record that decoded.
    pub last_failure: Option<FailureKind>,
}

/// Builds process tables from a proc root through a status source.
#[derive(Debug, Clone)]
pub struct TableBuilder<S> {
    root: PathBuf,
    source: S,
}

impl<S: StatusSource> TableBuilder<S> {
    pub fn new(root: impl Into<PathBuf>, source: S) -> Self {
        Self {
            root: root.into(),
            source,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerates, decodes, inserts and finally links every visible process.
    pub fn build(&self) -> BuildReport {
        let start = Instant::now();
        let mut report = BuildReport::default();

        let entries = match collect_proc_entries(&self.root) {
            Ok(v) => v,
            Err(e) => {
                warn!("{}", e);
                report.last_failure = Some(e.kind());
                return report;
            }
        };

        for entry in &entries {
            match self.source.read_process(&entry.proc_path, entry.pid) {
                Ok(info) => {
                    report.table.insert(info);
                }
                Err(ProcError::RecordUnreadable {
                    pid,
                    opened: false,
                    source,
                }) => {
                    // Exited between listing and reading.
                    debug!("Skipping pid {}: {}", pid, source);
                }
                Err(e) => {
                    match &e {
                        ProcError::MalformedRecord { .. } => warn!("{}", e),
                        _ => debug!("{}", e),
                    }
                    report.last_failure = Some(e.kind());
                }
            }
        }

        link_children(&mut report.table);

        info!(
            "Process table built: {} of {} entries in {:.2}ms",
            report.table.len(),
            entries.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        report
    }
}

/// Options for a snapshot of the running system.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub proc_root: PathBuf,
    pub app_marker: String,
    pub units: Units,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            app_marker: DEFAULT_APP_MARKER.to_string(),
            units: Units::detect(),
        }
    }
}

/// Builds a snapshot with the status source native to this platform.
pub fn build_snapshot(opts: &SnapshotOptions) -> BuildReport {
    let classifier = OwnershipClassifier::for_current_process(&opts.app_marker);
    TableBuilder::new(opts.proc_root.clone(), native_source(opts.units, classifier)).build()
}

/// The status source native to this platform.
#[cfg(not(any(target_os = "solaris", target_os = "illumos")))]
pub fn native_source(units: Units, classifier: OwnershipClassifier) -> NativeSource {
    NativeSource::new(units, classifier)
}

/// The status source native to this platform. Units are unused: binary
/// records already carry bytes and nanoseconds.
#[cfg(any(target_os = "solaris", target_os = "illumos"))]
pub fn native_source(_units: Units, classifier: OwnershipClassifier) -> NativeSource {
    NativeSource::new(classifier)
}
