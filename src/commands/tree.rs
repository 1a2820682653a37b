//! Tree command implementation.
//!
//! Prints the process forest, or one subtree, with aggregated usage.

use anyhow::{bail, Result};
use proctable::{build_snapshot, ProcessTable, SnapshotOptions};
use std::fmt::Write as _;

use super::format_bytes;

fn render_node(table: &ProcessTable, pid: u32, prefix: &str, last: bool, out: &mut String) {
    let Some(p) = table.get(pid) else {
        return;
    };
    let usage = table.tree_usage(pid);
    let marker = if p.is_owned_by_monitored_app { " [app]" } else { "" };
    let branch = if last { "└─ " } else { "├─ " };
    let _ = writeln!(
        out,
        "{}{}{} {}{} ({} procs, {}, {:.2}s cpu)",
        prefix,
        branch,
        p.id,
        p.command,
        marker,
        usage.processes,
        format_bytes(usage.working_set_size),
        usage.cpu_time()
    );

    let child_prefix = format!("{}{}", prefix, if last { "   " } else { "│  " });
    for (i, child) in p.children.iter().enumerate() {
        render_node(table, *child, &child_prefix, i + 1 == p.children.len(), out);
    }
}

/// Renders the subtrees rooted at `roots`.
fn render_forest(table: &ProcessTable, roots: &[u32]) -> String {
    let mut out = String::new();
    for (i, root) in roots.iter().enumerate() {
        render_node(table, *root, "", i + 1 == roots.len(), &mut out);
    }
    out
}

/// Prints the process forest, or the subtree of `pid`.
pub fn command_tree(opts: &SnapshotOptions, pid: Option<u32>) -> Result<()> {
    let report = build_snapshot(opts);
    let table = &report.table;

    let roots = match pid {
        Some(pid) => {
            if !table.contains(pid) {
                bail!("pid {} is not in the snapshot", pid);
            }
            vec![pid]
        }
        None => table.roots(),
    };

    print!("{}", render_forest(table, &roots));
    if let Some(kind) = report.last_failure {
        println!("⚠️  Some records were skipped (last failure: {})", kind);
    }
    Ok(())
}
