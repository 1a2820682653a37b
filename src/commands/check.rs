//! Check command implementation.
//!
//! Validates that the proc root is listable and status records parse.

use anyhow::{bail, Result};
use nix::unistd::geteuid;
use proctable::process::{collect_proc_entries, native_source, StatusSource};
use proctable::{build_snapshot, OwnershipClassifier, SnapshotOptions};

/// Validates proc access, own-record parsing and a full build.
pub fn command_check(opts: &SnapshotOptions) -> Result<()> {
    println!("🔍 proctable - System Check");
    println!("===========================");

    let mut all_ok = true;

    println!("\n📁 Checking {} ...", opts.proc_root.display());
    match collect_proc_entries(&opts.proc_root) {
        Ok(entries) if entries.is_empty() => {
            println!("   ❌ No process entries found");
            all_ok = false;
        }
        Ok(entries) => println!("   ✅ Can list {} process entries", entries.len()),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n📄 Checking own status record...");
    let own_pid = std::process::id();
    let own_dir = opts.proc_root.join(own_pid.to_string());
    let source = native_source(
        opts.units,
        OwnershipClassifier::for_current_process(&opts.app_marker),
    );
    match source.read_process(&own_dir, own_pid) {
        Ok(p) => {
            println!("   ✅ Parsed pid {} ({})", p.id, p.command);
            if !p.is_owned_by_monitored_app {
                println!("   ❌ Own process not classified as monitored app");
                all_ok = false;
            }
        }
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n🌲 Building full snapshot...");
    let report = build_snapshot(opts);
    println!(
        "   ✅ {} processes, {} roots",
        report.table.len(),
        report.table.roots().len()
    );
    if let Some(kind) = report.last_failure {
        println!("   ⚠️  Last failure: {}", kind);
    }

    if !geteuid().is_root() {
        println!("\n⚠️  Not running as root - records of other users may be hidden");
    }

    if !all_ok {
        bail!("system check failed");
    }
    println!("\n✅ All checks passed");
    Ok(())
}
