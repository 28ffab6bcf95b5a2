//! Run log setup.
//!
//! Every event goes to stderr and is appended, without ANSI colours, to the
//! log file in the audit directory. Verbosity comes from `BBS_AUDIT_LOG`
//! using `EnvFilter` syntax and defaults to `info`.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BBS_AUDIT_LOG";

/// Builds the subscriber writing to stderr and `file`.
pub fn subscriber(filter: EnvFilter, file: File) -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
}

/// Opens the log file for appending and installs the global subscriber.
///
/// A subscriber that is already installed is left in place.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init(log_file: &Path) -> Result<(), String> {
    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                format!("Failed to create log directory {}: {e}", parent.display())
            })?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| format!("Failed to open log file {}: {e}", log_file.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing::subscriber::set_global_default(subscriber(filter, file));
    Ok(())
}

/// Runs `f` under a `warn`-level subscriber and returns what it logged.
#[cfg(test)]
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    use std::io::{Read, Seek, SeekFrom};

    let file = tempfile::tempfile().unwrap();
    let mut reader = file.try_clone().unwrap();
    let value = tracing::subscriber::with_default(subscriber(EnvFilter::new("warn"), file), f);

    let mut log = String::new();
    reader.seek(SeekFrom::Start(0)).unwrap();
    reader.read_to_string(&mut log).unwrap();
    (value, log)
}
