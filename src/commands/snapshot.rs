//! Snapshot command implementation.
//!
//! Builds one process table and prints every entry.

use anyhow::Result;
use chrono::{DateTime, Utc};
use proctable::{build_snapshot, FailureKind, ProcessInfo, ResourceUsage, SnapshotOptions};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

use super::format_bytes;
use crate::cli::OutputFormat;

/// Structured form of one snapshot for JSON/YAML output.
#[derive(Serialize)]
struct SnapshotDocument<'a> {
    taken_at: DateTime<Utc>,
    proc_root: &'a Path,
    last_failure: Option<FailureKind>,
    owned: ResourceUsage,
    foreign: ResourceUsage,
    processes: Vec<&'a ProcessInfo>,
}

/// Renders entries as an aligned table, one process per line.
fn render_text(processes: &[&ProcessInfo]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>7} {:>7} {:<2} {:>11} {:>11} {:>9} {:>9} {:>9}  COMMAND",
        "PID", "PPID", "FL", "RSS", "VSZ", "USER(s)", "SYS(s)", "FAULTS"
    );
    for p in processes {
        let flags = format!(
            "{}{}",
            if p.is_owned_by_monitored_app { 'A' } else { '-' },
            if p.is_low_priority { 'L' } else { '-' }
        );
        let _ = writeln!(
            out,
            "{:>7} {:>7} {:<2} {:>11} {:>11} {:>9.2} {:>9.2} {:>9}  {}",
            p.id,
            p.parent_id,
            flags,
            format_bytes(p.working_set_size),
            format_bytes(p.swap_size),
            p.user_time,
            p.kernel_time,
            p.page_fault_count,
            p.command
        );
    }
    out
}

/// Takes one snapshot and prints it.
pub fn command_snapshot(opts: &SnapshotOptions, format: OutputFormat, owned_only: bool) -> Result<()> {
    let start = Instant::now();
    let report = build_snapshot(opts);
    let elapsed = start.elapsed();

    let processes: Vec<&ProcessInfo> = report
        .table
        .sorted()
        .into_iter()
        .filter(|p| !owned_only || p.is_owned_by_monitored_app)
        .collect();

    match format {
        OutputFormat::Text => {
            print!("{}", render_text(&processes));
            let owned = report.table.owned_usage();
            println!(
                "\n📊 {} processes in {:.2}ms, monitored app: {} processes, {} resident, {:.2}s cpu",
                report.table.len(),
                elapsed.as_secs_f64() * 1000.0,
                owned.processes,
                format_bytes(owned.working_set_size),
                owned.cpu_time()
            );
            if let Some(kind) = report.last_failure {
                println!("⚠️  Some records were skipped (last failure: {})", kind);
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let doc = SnapshotDocument {
                taken_at: Utc::now(),
                proc_root: &opts.proc_root,
                last_failure: report.last_failure,
                owned: report.table.owned_usage(),
                foreign: report.table.foreign_usage(),
                processes,
            };
            let output = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&doc)?,
                _ => serde_yaml::to_string(&doc)?,
            };
            println!("{output}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_flags_and_columns() {
        let owned = ProcessInfo {
            id: 42,
            parent_id: 1,
            command: "boinc".into(),
            working_set_size: 409_600,
            user_time: 2.5,
            is_owned_by_monitored_app: true,
            is_low_priority: true,
            ..Default::default()
        };
        let other = ProcessInfo {
            id: 43,
            parent_id: 1,
            command: "sshd".into(),
            ..Default::default()
        };

        let text = render_text(&[&owned, &other]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("PID"));
        assert!(lines[1].contains(" AL "));
        assert!(lines[1].contains("400.00 KB"));
        assert!(lines[1].contains("2.50"));
        assert!(lines[1].ends_with("boinc"));
        assert!(lines[2].contains(" -- "));
        assert!(lines[2].ends_with("sshd"));
    }

    #[test]
    fn test_document_serializes_failure_kind() {
        let doc = SnapshotDocument {
            taken_at: Utc::now(),
            proc_root: Path::new("/proc"),
            last_failure: Some(FailureKind::MalformedRecord),
            owned: ResourceUsage::default(),
            foreign: ResourceUsage::default(),
            processes: Vec::new(),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["last_failure"], "malformed_record");
        assert_eq!(json["proc_root"], "/proc");
    }
}
