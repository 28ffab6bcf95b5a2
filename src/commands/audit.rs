//! `bbs-audit [DIR] [--dry-run]`: probe and reconcile.

use std::fmt::Write;

use crate::config::AuditPaths;
use crate::context::ServiceContext;
use crate::reconcile::{ReconcileReport, Reconciler, RunOptions};

/// Execute an audit run and print a summary.
///
/// # Errors
///
/// Returns an error string if reconciliation fails.
pub fn run(ctx: &ServiceContext, paths: &AuditPaths, dry_run: bool) -> Result<(), String> {
    let report = Reconciler::new(ctx, paths, RunOptions { dry_run }).run()?;
    print!("{}", format_report(&report));
    Ok(())
}

/// Renders the human summary of a run.
#[must_use]
pub fn format_report(report: &ReconcileReport) -> String {
    let mut out = String::new();
    match &report.run {
        Some(run) => {
            let _ = writeln!(out, "Audit complete (run {run}):");
        }
        None => out.push_str("Dry run, nothing was changed. Would perform:\n"),
    }
    let _ = writeln!(out, "  live:  {}", report.live.len());
    let _ = writeln!(out, "  dead:  {}", report.newly_dead.len());
    for entry in &report.newly_dead.entries {
        let _ = writeln!(out, "    - {}", entry.address);
    }
    let _ = writeln!(out, "  moved: {}", report.moves.len());
    for record in &report.moves {
        let _ = writeln!(out, "    {} -> {}", record.original.display(), record.moved_to.display());
    }
    if !report.missing.is_empty() {
        let _ = writeln!(out, "  missing adverts: {}", report.missing.len());
        for path in &report.missing {
            let _ = writeln!(out, "    {}", path.display());
        }
    }
    if !report.skipped.is_empty() {
        let _ = writeln!(out, "  left in place: {}", report.skipped.len());
    }
    out
}
