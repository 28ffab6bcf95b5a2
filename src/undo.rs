//! Reversal of the most recent run.
//!
//! The newest ledger is replayed in recorded order, moving every file back
//! to where it came from, and then both registries are restored from the
//! matching snapshots. Missing files, occupied original paths and missing
//! snapshots degrade the undo instead of aborting it. Only one run is undone
//! per invocation.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::AuditPaths;
use crate::context::ServiceContext;
use crate::ledger::{self, RunBackup, RunId};

/// What an undo pass restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoReport {
    /// The run that was undone.
    pub run: RunId,
    /// Original paths files were moved back to.
    pub restored: Vec<PathBuf>,
    /// Ledger destinations that no longer held a file.
    pub missing: Vec<PathBuf>,
    /// Original paths that were occupied again, so the retired copy stayed
    /// in the dead-files directory.
    pub conflicts: Vec<PathBuf>,
    /// Whether both registries were restored from the run's snapshots.
    pub registries_restored: bool,
}

impl UndoReport {
    fn new(run: RunId) -> Self {
        Self {
            run,
            restored: Vec::new(),
            missing: Vec::new(),
            conflicts: Vec::new(),
            registries_restored: false,
        }
    }
}

/// Undoes the most recent run recorded in the backup directory.
///
/// A file is never moved onto an existing path. Ledgers and backups are kept,
/// so invoking this again replays the same run; every moved file then comes
/// up missing and a warning says the run looks already undone.
///
/// # Errors
///
/// Returns an error if no ledger exists, the ledger cannot be read, or a
/// file or registry cannot be restored.
pub fn undo_latest(ctx: &ServiceContext, paths: &AuditPaths) -> Result<UndoReport, String> {
    let run = ledger::latest(ctx, &paths.backup_dir)?
        .ok_or_else(|| format!("No undo log found in {}", paths.backup_dir.display()))?;
    info!(%run, "undoing run");

    let records = ledger::read_records(ctx, &paths.backup_dir, &run)?;
    let mut report = UndoReport::new(run);

    for record in &records {
        let moved_to = paths.resolve(&record.moved_to);
        if !ctx.fs.exists(&moved_to) {
            warn!(file = %record.moved_to.display(), "moved file not found; cannot restore");
            report.missing.push(record.moved_to.clone());
            continue;
        }
        let original = paths.resolve(&record.original);
        if ctx.fs.exists(&original) {
            warn!(
                file = %record.original.display(),
                kept = %record.moved_to.display(),
                "original path is occupied; leaving retired copy in place"
            );
            report.conflicts.push(record.original.clone());
            continue;
        }
        ctx.fs.rename(&moved_to, &original).map_err(|e| {
            format!(
                "Failed to restore {} to {}: {e}",
                record.moved_to.display(),
                record.original.display()
            )
        })?;
        info!(
            from = %record.moved_to.display(),
            to = %record.original.display(),
            "restored advert"
        );
        report.restored.push(record.original.clone());
    }

    if !records.is_empty() && report.missing.len() == records.len() {
        warn!(
            run = %report.run,
            "no moved file was found; run looks already undone, restoring registries again"
        );
    }

    let backup = RunBackup::for_run(&paths.backup_dir, &report.run);
    if ctx.fs.exists(&backup.live) && ctx.fs.exists(&backup.dead) {
        restore(ctx, &backup.live, &paths.adverts_file)?;
        restore(ctx, &backup.dead, &paths.dead_file)?;
        report.registries_restored = true;
        info!(run = %report.run, "registries restored from backup");
    } else {
        warn!(run = %report.run, "registry backup incomplete; registries left untouched");
    }

    info!(
        run = %report.run,
        restored = report.restored.len(),
        missing = report.missing.len(),
        conflicts = report.conflicts.len(),
        "undo complete"
    );
    Ok(report)
}

fn restore(ctx: &ServiceContext, snapshot: &Path, target: &Path) -> Result<(), String> {
    let contents = ctx
        .fs
        .read_to_string(snapshot)
        .map_err(|e| format!("Failed to read backup {}: {e}", snapshot.display()))?;
    ctx.fs
        .write_atomic(target, &contents)
        .map_err(|e| format!("Failed to restore {}: {e}", target.display()))
}
