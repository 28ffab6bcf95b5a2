//! Registry types and the JSON record store.
//!
//! A registry is a JSON array of entries:
//!
//! ```json
//! [{ "telnet": "bbs.example.com:2323", "adverts": ["ads/bbs.ans"] }]
//! ```
//!
//! Fields other than `telnet` and `adverts` are carried through untouched.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::ServiceContext;

/// One monitored service and the local files advertising it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// `host` or `host:port`.
    #[serde(rename = "telnet")]
    pub address: String,
    /// Advert files, relative to the audit directory.
    #[serde(rename = "adverts", default)]
    pub files: Vec<String>,
    /// Any other keys present in the source document.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Creates an entry with no extra fields.
    #[must_use]
    pub fn new(address: &str, files: &[&str]) -> Self {
        Self {
            address: address.to_string(),
            files: files.iter().map(ToString::to_string).collect(),
            extra: Map::new(),
        }
    }
}

/// Ordered collection of entries, persisted as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    /// Entries in document order.
    pub entries: Vec<Entry>,
}

impl Registry {
    /// Wraps a list of entries.
    #[must_use]
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Appends `newly_dead` after `existing`, preserving both orders.
    ///
    /// No deduplication is performed.
    #[must_use]
    pub fn merge(existing: &Registry, newly_dead: &Registry) -> Registry {
        let mut entries = Vec::with_capacity(existing.len() + newly_dead.len());
        entries.extend(existing.entries.iter().cloned());
        entries.extend(newly_dead.entries.iter().cloned());
        Registry { entries }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads and writes registry documents through `ctx.fs`.
pub struct RegistryStore<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RegistryStore<'a> {
    /// Creates a store over the context's filesystem.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Loads a registry that must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array of
    /// entries.
    pub fn load(&self, path: &Path) -> Result<Registry, String> {
        let contents = self
            .ctx
            .fs
            .read_to_string(path)
            .map_err(|e| format!("Failed to read registry {}: {e}", path.display()))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse registry {}: {e}", path.display()))
    }

    /// Loads a registry, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_empty(&self, path: &Path) -> Result<Registry, String> {
        if !self.ctx.fs.exists(path) {
            return Ok(Registry::default());
        }
        self.load(path)
    }

    /// Writes `[]` to `path` if nothing is there yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn ensure_exists(&self, path: &Path) -> Result<(), String> {
        if self.ctx.fs.exists(path) {
            return Ok(());
        }
        self.save(path, &Registry::default())
    }

    /// Replaces the registry file atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path, registry: &Registry) -> Result<(), String> {
        let mut json = serde_json::to_string_pretty(registry)
            .map_err(|e| format!("Failed to serialize registry {}: {e}", path.display()))?;
        json.push('\n');
        self.ctx
            .fs
            .write_atomic(path, &json)
            .map_err(|e| format!("Failed to write registry {}: {e}", path.display()))
    }
}
