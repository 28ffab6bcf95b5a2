//! `bbs-audit [DIR] --undo`: reverse the most recent run.

use std::fmt::Write;

use crate::config::AuditPaths;
use crate::context::ServiceContext;
use crate::undo::{undo_latest, UndoReport};

/// Execute an undo pass and print a summary.
///
/// # Errors
///
/// Returns an error string if no run can be undone or restoring fails.
pub fn run(ctx: &ServiceContext, paths: &AuditPaths) -> Result<(), String> {
    let report = undo_latest(ctx, paths)?;
    print!("{}", format_report(&report));
    Ok(())
}

/// Renders the human summary of an undo pass.
#[must_use]
pub fn format_report(report: &UndoReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Undid run {}:", report.run);
    let _ = writeln!(out, "  restored: {}", report.restored.len());
    for path in &report.restored {
        let _ = writeln!(out, "    {}", path.display());
    }
    if !report.missing.is_empty() {
        let _ = writeln!(out, "  not found: {}", report.missing.len());
    }
    if !report.conflicts.is_empty() {
        let _ = writeln!(
            out,
            "  left in dead dir (original path occupied): {}",
            report.conflicts.len()
        );
        for path in &report.conflicts {
            let _ = writeln!(out, "    {}", path.display());
        }
    }
    if report.registries_restored {
        out.push_str("  registries restored from backup\n");
    } else {
        out.push_str("  registries NOT restored: backup incomplete\n");
    }
    out
}
