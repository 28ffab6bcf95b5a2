//! Run backups and the append-only undo ledger.
//!
//! Every non-dry run gets a run identifier and three files in the backup
//! directory:
//!
//! ```text
//! <backup_dir>/
//!   ├── <run>.json        live registry as it was before the run
//!   ├── <run>_dead.json   dead registry as it was before the run
//!   └── <run>.undo        one `moved_to|original` line per file move
//! ```
//!
//! Ledger paths are relative to the audit directory, exactly as they appear
//! in the registry.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

use crate::config::AuditPaths;
use crate::context::ServiceContext;

const LEDGER_EXT: &str = ".undo";

/// Identifier shared by a run's snapshots and ledger.
///
/// A UTC timestamp with microseconds followed by a random suffix, so names
/// sort chronologically and two runs in the same instant still differ.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(String);

impl RunId {
    /// Derives a fresh identifier from the context's clock and ID generator.
    #[must_use]
    pub fn generate(ctx: &ServiceContext) -> Self {
        let stamp = ctx.clock.now().format("%Y%m%dT%H%M%S%6fZ");
        let suffix: String = ctx.id_gen.generate_id().chars().take(8).collect();
        Self(format!("{stamp}-{suffix}"))
    }

    /// Recovers the identifier from a ledger file name.
    #[must_use]
    pub fn from_ledger_name(name: &str) -> Option<Self> {
        name.strip_suffix(LEDGER_EXT).filter(|id| !id.is_empty()).map(|id| Self(id.to_string()))
    }

    /// The identifier as used in file names.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One file move performed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    /// Where the file was moved to.
    pub moved_to: PathBuf,
    /// Where the file came from.
    pub original: PathBuf,
}

impl UndoRecord {
    /// Encodes the record as a ledger line.
    ///
    /// Returns `None` when either path contains `|` or a line break and so
    /// could not be read back unambiguously.
    #[must_use]
    pub fn encode(&self) -> Option<String> {
        let moved_to = self.moved_to.to_str()?;
        let original = self.original.to_str()?;
        let unsafe_char = |s: &str| s.contains(&['|', '\n', '\r'][..]);
        if unsafe_char(moved_to) || unsafe_char(original) {
            return None;
        }
        Some(format!("{moved_to}|{original}"))
    }

    /// Decodes a ledger line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not `moved_to|original` with both
    /// halves non-empty.
    pub fn decode(line: &str) -> Result<Self, String> {
        match line.split_once('|') {
            Some((moved_to, original)) if !moved_to.is_empty() && !original.is_empty() => {
                Ok(Self { moved_to: PathBuf::from(moved_to), original: PathBuf::from(original) })
            }
            _ => Err(format!("Malformed undo record: {line:?}")),
        }
    }
}

/// Locations of one run's registry snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunBackup {
    /// Snapshot of the live registry.
    pub live: PathBuf,
    /// Snapshot of the dead registry.
    pub dead: PathBuf,
}

impl RunBackup {
    /// Snapshot paths for `run` inside `backup_dir`.
    #[must_use]
    pub fn for_run(backup_dir: &Path, run: &RunId) -> Self {
        Self {
            live: backup_dir.join(format!("{run}.json")),
            dead: backup_dir.join(format!("{run}_dead.json")),
        }
    }
}

/// Path of the ledger for `run` inside `backup_dir`.
#[must_use]
pub fn ledger_path(backup_dir: &Path, run: &RunId) -> PathBuf {
    backup_dir.join(format!("{run}{LEDGER_EXT}"))
}

/// Writer for the current run's ledger.
pub struct Ledger<'a> {
    ctx: &'a ServiceContext,
    run: RunId,
    path: PathBuf,
}

impl<'a> Ledger<'a> {
    /// Snapshots both registries and creates an empty ledger for `run`.
    ///
    /// Both registry files must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot copy or the ledger creation fails.
    pub fn begin(ctx: &'a ServiceContext, paths: &AuditPaths, run: RunId) -> Result<Self, String> {
        let backup = RunBackup::for_run(&paths.backup_dir, &run);
        snapshot(ctx, &paths.adverts_file, &backup.live)?;
        snapshot(ctx, &paths.dead_file, &backup.dead)?;

        let path = ledger_path(&paths.backup_dir, &run);
        ctx.fs
            .write_atomic(&path, "")
            .map_err(|e| format!("Failed to create undo ledger {}: {e}", path.display()))?;
        Ok(Self { ctx, run, path })
    }

    /// The run this ledger belongs to.
    #[must_use]
    pub fn run(&self) -> &RunId {
        &self.run
    }

    /// Appends one record and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn record(&self, record: &UndoRecord) -> Result<(), String> {
        let line = record.encode().ok_or_else(|| {
            format!(
                "Cannot encode undo record for {} -> {}",
                record.original.display(),
                record.moved_to.display()
            )
        })?;
        self.ctx
            .fs
            .append_line(&self.path, &line)
            .map_err(|e| format!("Failed to append to undo ledger {}: {e}", self.path.display()))
    }
}

fn snapshot(ctx: &ServiceContext, from: &Path, to: &Path) -> Result<(), String> {
    ctx.fs
        .copy(from, to)
        .map_err(|e| format!("Failed to back up {} to {}: {e}", from.display(), to.display()))
}

/// Finds the most recently written ledger in `backup_dir`.
///
/// Newest modification time wins; equal times fall back to the greater run
/// identifier.
///
/// # Errors
///
/// Returns an error if the backup directory or a ledger's metadata cannot be
/// read.
pub fn latest(ctx: &ServiceContext, backup_dir: &Path) -> Result<Option<RunId>, String> {
    if !ctx.fs.exists(backup_dir) {
        return Ok(None);
    }
    let names = ctx
        .fs
        .list_dir(backup_dir)
        .map_err(|e| format!("Failed to list backup directory {}: {e}", backup_dir.display()))?;

    let mut best: Option<(SystemTime, RunId)> = None;
    for run in names.iter().filter_map(|name| RunId::from_ledger_name(name)) {
        let path = ledger_path(backup_dir, &run);
        let modified = ctx
            .fs
            .modified(&path)
            .map_err(|e| format!("Failed to stat undo ledger {}: {e}", path.display()))?;
        let candidate = (modified, run);
        if best.as_ref().map_or(true, |current| candidate > *current) {
            best = Some(candidate);
        }
    }
    Ok(best.map(|(_, run)| run))
}

/// Reads a run's ledger in recorded order.
///
/// Every record is written with its line terminator, so a final line without
/// one was cut short by a crash and is skipped with a warning even when it
/// still decodes. Blank lines are ignored and malformed lines are skipped
/// with a warning.
///
/// # Errors
///
/// Returns an error if the ledger cannot be read.
pub fn read_records(
    ctx: &ServiceContext,
    backup_dir: &Path,
    run: &RunId,
) -> Result<Vec<UndoRecord>, String> {
    let path = ledger_path(backup_dir, run);
    let contents = ctx
        .fs
        .read_to_string(&path)
        .map_err(|e| format!("Failed to read undo ledger {}: {e}", path.display()))?;

    let (complete, torn) = contents.rsplit_once('\n').unwrap_or(("", contents.as_str()));
    if !torn.trim().is_empty() {
        warn!(
            ledger = %path.display(),
            line = ?torn,
            "last undo record is incomplete; skipping"
        );
    }

    let mut records = Vec::new();
    for line in complete.lines().filter(|l| !l.trim().is_empty()) {
        match UndoRecord::decode(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(ledger = %path.display(), "{e}; skipping"),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::adapters::memory::{FixedClock, MemFileSystem, ScriptedProber, SequentialIdGenerator};
    use crate::logging::capture_warnings;

    fn make_test_context(fs: Arc<MemFileSystem>) -> ServiceContext {
        ServiceContext::new(
            Box::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 14, 22, 33).unwrap())),
            Box::new(fs),
            Box::new(SequentialIdGenerator::default()),
            Box::new(ScriptedProber::new()),
        )
    }

    fn record(to: &str, from: &str) -> UndoRecord {
        UndoRecord { moved_to: PathBuf::from(to), original: PathBuf::from(from) }
    }

    #[test]
    fn run_ids_are_timestamped_and_distinct_within_one_instant() {
        let ctx = make_test_context(Arc::new(MemFileSystem::new()));
        let first = RunId::generate(&ctx);
        let second = RunId::generate(&ctx);

        assert_eq!(first.as_str(), "20261018T142233000000Z-00000001");
        assert_eq!(second.as_str(), "20261018T142233000000Z-00000002");
        assert!(second > first);
    }

    #[test]
    fn ledger_names_round_trip_to_run_ids() {
        assert_eq!(RunId::from_ledger_name("abc.undo"), Some(RunId("abc".to_string())));
        assert_eq!(RunId::from_ledger_name("abc.json"), None);
        assert_eq!(RunId::from_ledger_name(".undo"), None);
    }

    #[test]
    fn records_encode_as_pipe_lines() {
        let r = record("dead_adverts/a.txt", "a.txt");
        assert_eq!(r.encode().as_deref(), Some("dead_adverts/a.txt|a.txt"));
        assert_eq!(UndoRecord::decode("dead_adverts/a.txt|a.txt").unwrap(), r);
    }

    #[test]
    fn records_with_separator_in_path_refuse_to_encode() {
        assert_eq!(record("dead/a|b", "a|b").encode(), None);
        assert_eq!(record("dead/a\nb", "a\nb").encode(), None);
    }

    #[test]
    fn malformed_lines_fail_to_decode() {
        assert!(UndoRecord::decode("no separator").is_err());
        assert!(UndoRecord::decode("|a.txt").is_err());
        assert!(UndoRecord::decode("dead/a.txt|").is_err());
    }

    #[test]
    fn begin_snapshots_registries_and_creates_empty_ledger() {
        let fs = Arc::new(
            MemFileSystem::new()
                .with_file("/bbs/adverts.json", "[live]")
                .with_file("/bbs/dead_adverts.json", "[dead]"),
        );
        let ctx = make_test_context(fs.clone());
        let paths = AuditPaths::in_dir(Path::new("/bbs"));
        let run = RunId::generate(&ctx);

        let ledger = Ledger::begin(&ctx, &paths, run.clone()).unwrap();
        assert_eq!(ledger.run(), &run);

        let backup = RunBackup::for_run(&paths.backup_dir, &run);
        assert_eq!(fs.contents(&backup.live).as_deref(), Some("[live]"));
        assert_eq!(fs.contents(&backup.dead).as_deref(), Some("[dead]"));
        assert_eq!(fs.contents(ledger_path(&paths.backup_dir, &run)).as_deref(), Some(""));
    }

    #[test]
    fn recorded_lines_read_back_in_order() {
        let fs = Arc::new(
            MemFileSystem::new()
                .with_file("/bbs/adverts.json", "[]")
                .with_file("/bbs/dead_adverts.json", "[]"),
        );
        let ctx = make_test_context(fs);
        let paths = AuditPaths::in_dir(Path::new("/bbs"));
        let ledger = Ledger::begin(&ctx, &paths, RunId::generate(&ctx)).unwrap();

        ledger.record(&record("dead_adverts/a.txt", "a.txt")).unwrap();
        ledger.record(&record("dead_adverts/b/c.txt", "b/c.txt")).unwrap();

        let records = read_records(&ctx, &paths.backup_dir, ledger.run()).unwrap();
        assert_eq!(
            records,
            vec![record("dead_adverts/a.txt", "a.txt"), record("dead_adverts/b/c.txt", "b/c.txt")]
        );
    }

    fn read_ledger(contents: &str) -> (Vec<UndoRecord>, String) {
        let fs = Arc::new(MemFileSystem::new().with_file("/b/r1.undo", contents));
        let ctx = make_test_context(fs);
        let run = RunId("r1".to_string());
        capture_warnings(|| read_records(&ctx, Path::new("/b"), &run).unwrap())
    }

    #[test]
    fn read_records_skips_blank_and_malformed_lines() {
        let (records, log) = read_ledger("dead/a.txt|a.txt\n\nno separator\n");
        assert_eq!(records, vec![record("dead/a.txt", "a.txt")]);
        assert!(log.contains("Malformed undo record"));
    }

    #[test]
    fn unterminated_last_line_is_dropped_even_if_it_decodes() {
        let (records, log) = read_ledger("dead/a.txt|a.txt\ndead/b.txt|b.t");
        assert_eq!(records, vec![record("dead/a.txt", "a.txt")]);
        assert!(log.contains("last undo record is incomplete"));

        let (records, _) = read_ledger("dead/b.t");
        assert!(records.is_empty());
    }

    #[test]
    fn latest_prefers_newest_modification_time() {
        let fs = Arc::new(
            MemFileSystem::new()
                .with_file("/b/20260101T000000000000Z-00000001.undo", "")
                .with_file("/b/20250101T000000000000Z-00000001.undo", "")
                .with_file("/b/20260101T000000000000Z-00000001.json", "[]"),
        );
        let ctx = make_test_context(fs);

        // The 2025 ledger was written last, so clock skew aside it is newest.
        let latest = latest(&ctx, Path::new("/b")).unwrap().unwrap();
        assert_eq!(latest.as_str(), "20250101T000000000000Z-00000001");
    }

    #[test]
    fn latest_breaks_ties_by_name() {
        let fs = Arc::new(
            MemFileSystem::new().with_file("/b/run-a.undo", "").with_file("/b/run-b.undo", ""),
        );
        fs.set_modified("/b/run-a.undo", 7);
        fs.set_modified("/b/run-b.undo", 7);
        let ctx = make_test_context(fs);

        assert_eq!(latest(&ctx, Path::new("/b")).unwrap().unwrap().as_str(), "run-b");
    }

    #[test]
    fn latest_is_none_without_ledgers() {
        let ctx = make_test_context(Arc::new(MemFileSystem::new().with_file("/b/x.json", "[]")));
        assert_eq!(latest(&ctx, Path::new("/b")).unwrap(), None);
        assert_eq!(latest(&ctx, Path::new("/missing")).unwrap(), None);
    }
}
