//! In-memory adapters for deterministic runs.
//!
//! These back the unit and integration tests: no disk, no network, and a
//! clock that only moves when told to.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod probe;

pub use clock::FixedClock;
pub use filesystem::MemFileSystem;
pub use id_gen::SequentialIdGenerator;
pub use probe::ScriptedProber;
