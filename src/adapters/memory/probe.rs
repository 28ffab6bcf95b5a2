//! Scripted prober.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::ports::probe::{Prober, Reachability};

/// Prober answering from a fixed table; unknown endpoints are unreachable.
///
/// Every call is recorded so tests can assert probe order.
#[derive(Default)]
pub struct ScriptedProber {
    answers: HashMap<String, Reachability>,
    calls: Mutex<Vec<Endpoint>>,
}

impl ScriptedProber {
    /// Creates a prober where every endpoint is unreachable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `host:port` as reachable.
    #[must_use]
    pub fn reachable(mut self, endpoint: &str) -> Self {
        self.answers.insert(endpoint.to_string(), Reachability::Reachable);
        self
    }

    /// Endpoints probed so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Prober for ScriptedProber {
    fn probe(&self, endpoint: &Endpoint, _timeout: Duration) -> Reachability {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(endpoint.clone());
        self.answers.get(&endpoint.to_string()).copied().unwrap_or(Reachability::Unreachable)
    }
}
