//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI parser for `bbs-audit`.
#[derive(Debug, Parser)]
#[command(
    name = "bbs-audit",
    version,
    about = "Probe listed BBS endpoints and retire the unreachable ones"
)]
pub struct Cli {
    /// Audit directory containing adverts.json.
    #[arg(env = "BBS_AUDIT_DIR")]
    pub directory: Option<PathBuf>,

    /// Log what would change without touching any file.
    #[arg(long, conflicts_with = "undo")]
    pub dry_run: bool,

    /// Reverse the most recent run.
    #[arg(long)]
    pub undo: bool,
}

/// What an invocation should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Probe and reconcile.
    Audit {
        /// Simulate only.
        dry_run: bool,
    },
    /// Undo the last run.
    Undo,
}

impl Cli {
    /// The selected mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.undo {
            Mode::Undo
        } else {
            Mode::Audit { dry_run: self.dry_run }
        }
    }

    /// The audit directory, defaulting to the current directory.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
