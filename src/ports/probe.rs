//! Reachability port for TCP endpoints.

use std::fmt;
use std::time::Duration;

use crate::endpoint::Endpoint;

/// Outcome of a single reachability probe.
///
/// An unreachable endpoint is an ordinary result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// A TCP connection was established within the timeout.
    Reachable,
    /// The connection was refused, timed out, or the host did not resolve.
    Unreachable,
}

impl Reachability {
    /// Returns `true` for [`Reachability::Reachable`].
    #[must_use]
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Reachable)
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable => f.write_str("reachable"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Checks whether an endpoint accepts TCP connections.
pub trait Prober: Send + Sync {
    /// Attempts a connection, blocking for at most `timeout`.
    fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> Reachability;
}

impl<P: Prober + ?Sized> Prober for std::sync::Arc<P> {
    fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> Reachability {
        (**self).probe(endpoint, timeout)
    }
}
