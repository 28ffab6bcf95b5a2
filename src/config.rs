//! Audit directory layout and tunables.
//!
//! Defaults match the conventional layout. An optional `bbs-audit.yaml` in
//! the audit directory may override any key:
//!
//! ```text
//! <dir>/
//!   ├── adverts.json        live registry
//!   ├── dead_adverts.json   dead registry
//!   ├── dead_adverts/       retired advert files
//!   ├── backups/            <run>.json, <run>_dead.json, <run>.undo
//!   └── bbs_audit.log       run log
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::endpoint::DEFAULT_PORT;
use crate::ports::FileSystem;

/// Name of the optional per-directory config file.
pub const CONFIG_FILE: &str = "bbs-audit.yaml";

/// Raw configuration as written in `bbs-audit.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Live registry file.
    pub adverts_file: PathBuf,
    /// Dead registry file.
    pub dead_file: PathBuf,
    /// Directory receiving files of dead entries.
    pub dead_dir: PathBuf,
    /// Directory holding registry snapshots and undo ledgers.
    pub backup_dir: PathBuf,
    /// Append-only run log.
    pub log_file: PathBuf,
    /// Connect timeout per probe, in seconds.
    pub probe_timeout_secs: u64,
    /// Port used when an address has none.
    pub default_port: u16,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            adverts_file: PathBuf::from("adverts.json"),
            dead_file: PathBuf::from("dead_adverts.json"),
            dead_dir: PathBuf::from("dead_adverts"),
            backup_dir: PathBuf::from("backups"),
            log_file: PathBuf::from("bbs_audit.log"),
            probe_timeout_secs: 3,
            default_port: DEFAULT_PORT,
        }
    }
}

impl AuditConfig {
    /// Loads `<dir>/bbs-audit.yaml`, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if it sets a zero probe timeout or default port.
    pub fn load(fs: &dyn FileSystem, dir: &Path) -> Result<Self, String> {
        let path = dir.join(CONFIG_FILE);
        if !fs.exists(&path) {
            return Ok(Self::default());
        }
        let contents = fs
            .read_to_string(&path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
        config.validate().map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Rejects values under which no probe could ever succeed.
    fn validate(&self) -> Result<(), String> {
        if self.probe_timeout_secs == 0 {
            return Err("probe_timeout_secs must be at least 1".to_string());
        }
        if self.default_port == 0 {
            return Err("default_port must be between 1 and 65535".to_string());
        }
        Ok(())
    }

    /// Resolves every path against the audit directory.
    #[must_use]
    pub fn resolve(&self, dir: &Path) -> AuditPaths {
        AuditPaths {
            root: dir.to_path_buf(),
            adverts_file: dir.join(&self.adverts_file),
            dead_file: dir.join(&self.dead_file),
            dead_dir: self.dead_dir.clone(),
            backup_dir: dir.join(&self.backup_dir),
            log_file: dir.join(&self.log_file),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            default_port: self.default_port,
        }
    }
}

/// Resolved locations and tunables for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditPaths {
    /// The audit directory; advert paths are relative to it.
    pub root: PathBuf,
    /// Live registry file.
    pub adverts_file: PathBuf,
    /// Dead registry file.
    pub dead_file: PathBuf,
    /// Dead-files directory, relative to `root` as recorded in the ledger.
    pub dead_dir: PathBuf,
    /// Backup directory.
    pub backup_dir: PathBuf,
    /// Run log.
    pub log_file: PathBuf,
    /// Connect timeout per probe.
    pub probe_timeout: Duration,
    /// Port used when an address has none.
    pub default_port: u16,
}

impl AuditPaths {
    /// Default layout rooted at `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        AuditConfig::default().resolve(dir)
    }

    /// Turns a registry- or ledger-relative path into a real one.
    #[must_use]
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemFileSystem;

    #[test]
    fn missing_file_yields_defaults() {
        let fs = MemFileSystem::new();
        let config = AuditConfig::load(&fs, Path::new("/bbs")).unwrap();
        assert_eq!(config, AuditConfig::default());

        let paths = config.resolve(Path::new("/bbs"));
        assert_eq!(paths.adverts_file, PathBuf::from("/bbs/adverts.json"));
        assert_eq!(paths.dead_dir, PathBuf::from("dead_adverts"));
        assert_eq!(paths.probe_timeout, Duration::from_secs(3));
        assert_eq!(paths.default_port, 23);
    }

    #[test]
    fn partial_file_overrides_named_keys() {
        let fs = MemFileSystem::new()
            .with_file("/bbs/bbs-audit.yaml", "dead_dir: graveyard\nprobe_timeout_secs: 1\n");
        let config = AuditConfig::load(&fs, Path::new("/bbs")).unwrap();

        assert_eq!(config.dead_dir, PathBuf::from("graveyard"));
        assert_eq!(config.probe_timeout_secs, 1);
        assert_eq!(config.adverts_file, PathBuf::from("adverts.json"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let fs = MemFileSystem::new().with_file("/bbs/bbs-audit.yaml", "dead_directory: x\n");
        let err = AuditConfig::load(&fs, Path::new("/bbs")).unwrap_err();
        assert!(err.contains("Failed to parse config"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let fs = MemFileSystem::new().with_file("/bbs/bbs-audit.yaml", "probe_timeout_secs: 0\n");
        let err = AuditConfig::load(&fs, Path::new("/bbs")).unwrap_err();
        assert!(err.contains("Failed to parse config"));
        assert!(err.contains("probe_timeout_secs"));
    }

    #[test]
    fn zero_default_port_is_rejected() {
        let fs = MemFileSystem::new().with_file("/bbs/bbs-audit.yaml", "default_port: 0\n");
        let err = AuditConfig::load(&fs, Path::new("/bbs")).unwrap_err();
        assert!(err.contains("default_port"));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let fs = MemFileSystem::new().with_file("/bbs/bbs-audit.yaml", "\n");
        assert_eq!(AuditConfig::load(&fs, Path::new("/bbs")).unwrap(), AuditConfig::default());
    }
}
