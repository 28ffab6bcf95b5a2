//! Live TCP prober.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::endpoint::Endpoint;
use crate::ports::probe::{Prober, Reachability};

/// Prober that opens a real TCP connection and drops it immediately.
///
/// The timeout is one budget shared by every address the host resolves to.
/// Name resolution goes through the system resolver, which cannot be
/// interrupted; time it takes is charged against the same budget.
pub struct TcpProber;

impl Prober for TcpProber {
    fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> Reachability {
        let deadline = Instant::now() + timeout;
        let target = (endpoint.host.as_str(), endpoint.port);
        let addrs: Vec<SocketAddr> = match target.to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                debug!(%endpoint, error = %e, "address did not resolve");
                return Reachability::Unreachable;
            }
        };

        for addr in addrs {
            let Some(remaining) = remaining_until(deadline) else {
                debug!(%endpoint, %addr, "timeout spent before connecting");
                break;
            };
            match TcpStream::connect_timeout(&addr, remaining) {
                Ok(_) => return Reachability::Reachable,
                Err(e) => debug!(%endpoint, %addr, error = %e, "connect failed"),
            }
        }
        Reachability::Unreachable
    }
}

/// Time left before `deadline`, or `None` once it has passed.
fn remaining_until(deadline: Instant) -> Option<Duration> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    (!remaining.is_zero()).then_some(remaining)
}
