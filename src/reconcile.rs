//! Reconciliation of the live registry against reachability probes.
//!
//! Each live entry is probed once, in order. Reachable entries stay live.
//! Unreachable entries move to the dead registry and their advert files are
//! relocated under the dead-files directory, every move being written to the
//! run's undo ledger before it happens. Registries are rewritten once, at the
//! end of the run, and only outside dry-run mode.

use std::path::{Component, Path, PathBuf};

use tracing::{info, warn};

use crate::config::AuditPaths;
use crate::context::ServiceContext;
use crate::endpoint::Endpoint;
use crate::ledger::{Ledger, RunId, UndoRecord};
use crate::registry::{Entry, Registry, RegistryStore};

/// Options for a single reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Log intended effects without touching any file.
    pub dry_run: bool,
}

/// What a run did, or in dry-run mode would have done.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Identifier of the run's backups and ledger; `None` for dry runs.
    pub run: Option<RunId>,
    /// Entries that answered, in original order.
    pub live: Registry,
    /// Entries that did not answer, in original order.
    pub newly_dead: Registry,
    /// File moves performed (or planned), relative to the audit directory.
    pub moves: Vec<UndoRecord>,
    /// Advert files that were listed but not found.
    pub missing: Vec<PathBuf>,
    /// Advert files left in place because their move could not be recorded.
    pub skipped: Vec<PathBuf>,
}

/// Drives one reconciliation pass over the audit directory.
pub struct Reconciler<'a> {
    ctx: &'a ServiceContext,
    paths: &'a AuditPaths,
    options: RunOptions,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler for the given directory layout.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, paths: &'a AuditPaths, options: RunOptions) -> Self {
        Self { ctx, paths, options }
    }

    /// Probes every live entry and reconciles the registries.
    ///
    /// # Errors
    ///
    /// Returns an error if the live registry is missing or unreadable, if the
    /// backups cannot be taken, or if a file move or registry write fails.
    /// Unreachable hosts and missing advert files are not errors.
    pub fn run(&self) -> Result<ReconcileReport, String> {
        let store = RegistryStore::new(self.ctx);
        let dry_run = self.options.dry_run;

        if !self.ctx.fs.exists(&self.paths.adverts_file) {
            return Err(format!("Live registry not found: {}", self.paths.adverts_file.display()));
        }
        let live = store.load(&self.paths.adverts_file)?;
        if !dry_run {
            store.ensure_exists(&self.paths.dead_file)?;
        }
        let existing_dead = store.load_or_empty(&self.paths.dead_file)?;

        let ledger = if dry_run {
            None
        } else {
            Some(Ledger::begin(self.ctx, self.paths, RunId::generate(self.ctx))?)
        };

        let mut report =
            ReconcileReport { run: ledger.as_ref().map(|l| l.run().clone()), ..Default::default() };
        info!(
            run = report.run.as_ref().map_or("dry-run", RunId::as_str),
            entries = live.len(),
            dry_run,
            "starting audit"
        );

        for entry in live.entries {
            let endpoint = Endpoint::parse_with_default(&entry.address, self.paths.default_port);
            let reachability = self.ctx.prober.probe(&endpoint, self.paths.probe_timeout);
            if reachability.is_reachable() {
                info!(%endpoint, "reachable, keeping");
                report.live.entries.push(entry);
            } else {
                info!(%endpoint, adverts = entry.files.len(), "unreachable, retiring");
                self.retire(&entry, ledger.as_ref(), &mut report)?;
                report.newly_dead.entries.push(entry);
            }
        }

        if dry_run {
            info!(
                live = report.live.len(),
                dead = report.newly_dead.len(),
                moves = report.moves.len(),
                "dry run complete; nothing written"
            );
            return Ok(report);
        }

        store.save(&self.paths.adverts_file, &report.live)?;
        store.save(&self.paths.dead_file, &Registry::merge(&existing_dead, &report.newly_dead))?;
        info!(
            live = report.live.len(),
            dead = report.newly_dead.len(),
            moves = report.moves.len(),
            missing = report.missing.len(),
            "audit complete"
        );
        Ok(report)
    }

    fn retire(
        &self,
        entry: &Entry,
        ledger: Option<&Ledger<'_>>,
        report: &mut ReconcileReport,
    ) -> Result<(), String> {
        for file in &entry.files {
            let original = PathBuf::from(file);
            let source = self.paths.resolve(&original);
            if !self.ctx.fs.exists(&source) {
                warn!(
                    address = %entry.address,
                    file = %original.display(),
                    "advert file not found; skipping"
                );
                report.missing.push(original);
                continue;
            }

            let Some(target) = dead_destination(&self.paths.dead_dir, &original) else {
                warn!(file = %original.display(), "advert path has no file component; skipping");
                report.skipped.push(original);
                continue;
            };
            let record = UndoRecord { moved_to: self.unclaimed(target), original };

            let Some(ledger) = ledger else {
                info!(
                    from = %record.original.display(),
                    to = %record.moved_to.display(),
                    "dry run: would move advert"
                );
                report.moves.push(record);
                continue;
            };

            if record.encode().is_none() {
                warn!(
                    file = %record.original.display(),
                    "advert path cannot be recorded for undo; leaving in place"
                );
                report.skipped.push(record.original);
                continue;
            }
            ledger.record(&record)?;
            self.ctx
                .fs
                .rename(&source, &self.paths.resolve(&record.moved_to))
                .map_err(|e| {
                    format!(
                        "Failed to move {} to {}: {e}",
                        record.original.display(),
                        record.moved_to.display()
                    )
                })?;
            info!(
                from = %record.original.display(),
                to = %record.moved_to.display(),
                "moved advert"
            );
            report.moves.push(record);
        }
        Ok(())
    }

    /// First of `target`, `target.1`, `target.2`, ... not already on disk.
    fn unclaimed(&self, target: PathBuf) -> PathBuf {
        if !self.ctx.fs.exists(&self.paths.resolve(&target)) {
            return target;
        }
        let mut n = 1u32;
        loop {
            let mut name = target.clone().into_os_string();
            name.push(format!(".{n}"));
            let candidate = PathBuf::from(name);
            if !self.ctx.fs.exists(&self.paths.resolve(&candidate)) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Re-roots an advert path under the dead-files directory.
///
/// Subdirectories are preserved; root, prefix, `.` and `..` components are
/// dropped. Returns `None` if nothing remains.
#[must_use]
pub fn dead_destination(dead_dir: &Path, original: &Path) -> Option<PathBuf> {
    let relative: PathBuf = original
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(dead_dir.join(relative))
}
