//! Endpoint parsing for registry addresses.
//!
//! Addresses are written `host` or `host:port`. Parsing never fails: anything
//! that does not split cleanly is treated as a bare host on the default port.

use std::fmt;

/// Port assumed when an address does not name one.
pub const DEFAULT_PORT: u16 = 23;

/// A host and TCP port to probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Host name or IP literal, unvalidated.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Parses an address using [`DEFAULT_PORT`] when none is given.
    #[must_use]
    pub fn parse(address: &str) -> Self {
        Self::parse_with_default(address, DEFAULT_PORT)
    }

    /// Parses an address, splitting on the first colon.
    ///
    /// An empty port keeps the host part. A port that is not a valid `u16`
    /// degrades to host = whole address.
    #[must_use]
    pub fn parse_with_default(address: &str, default_port: u16) -> Self {
        match address.split_once(':') {
            None => Self { host: address.to_string(), port: default_port },
            Some((host, "")) => Self { host: host.to_string(), port: default_port },
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => Self { host: host.to_string(), port },
                Err(_) => Self { host: address.to_string(), port: default_port },
            },
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
