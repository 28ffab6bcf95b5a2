//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the audit core and something
//! outside the process (time, disk, randomness, the network).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod probe;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use probe::{Prober, Reachability};
