//! Service context bundling all port trait objects.

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::id_gen::LiveIdGenerator;
use crate::adapters::live::probe::TcpProber;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::id_gen::IdGenerator;
use crate::ports::probe::Prober;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. The reconciliation
/// engine and the undo executor only ever reach the outside world through
/// these.
pub struct ServiceContext {
    /// Clock for run identifiers.
    pub clock: Box<dyn Clock>,
    /// Filesystem for registries, adverts, backups and ledgers.
    pub fs: Box<dyn FileSystem>,
    /// ID generator for run identifier suffixes.
    pub id_gen: Box<dyn IdGenerator>,
    /// TCP reachability checks.
    pub prober: Box<dyn Prober>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(
        clock: Box<dyn Clock>,
        fs: Box<dyn FileSystem>,
        id_gen: Box<dyn IdGenerator>,
        prober: Box<dyn Prober>,
    ) -> Self {
        Self { clock, fs, id_gen, prober }
    }

    /// Creates a live context with real adapters for every port.
    #[must_use]
    pub fn live() -> Self {
        Self::new(
            Box::new(LiveClock),
            Box::new(LiveFileSystem),
            Box::new(LiveIdGenerator),
            Box::new(TcpProber),
        )
    }
}
