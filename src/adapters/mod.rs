//! Adapter implementations for port traits.
//!
//! - `live`: real disk, system clock, random IDs and TCP connections.
//! - `memory`: in-memory stand-ins for deterministic tests.

pub mod live;
pub mod memory;
