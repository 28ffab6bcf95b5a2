//! Filesystem port for file I/O operations.

use std::path::Path;
use std::time::SystemTime;

/// Error type shared by the filesystem port methods.
pub type FsError = Box<dyn std::error::Error + Send + Sync>;

/// Provides filesystem access for registries, adverts, backups and ledgers.
///
/// Abstracting the filesystem lets the reconciliation and undo logic run
/// against an in-memory tree in tests.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, FsError>;

    /// Replaces a file's contents without ever exposing a partial write.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary write or the final rename fails.
    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), FsError>;

    /// Appends one line to a file and flushes it before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, written, or synced.
    fn append_line(&self, path: &Path, line: &str) -> Result<(), FsError>;

    /// Copies a file byte-for-byte, overwriting the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the copy fails.
    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Moves a file, creating the destination's parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing or the rename fails.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Returns the last modification time of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist.
    fn modified(&self, path: &Path) -> Result<SystemTime, FsError>;

    /// Lists the entry names in a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError>;
}

impl<F: FileSystem + ?Sized> FileSystem for std::sync::Arc<F> {
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        (**self).read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        (**self).write_atomic(path, contents)
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<(), FsError> {
        (**self).append_line(path, line)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        (**self).copy(from, to)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        (**self).rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn modified(&self, path: &Path) -> Result<SystemTime, FsError> {
        (**self).modified(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
        (**self).list_dir(path)
    }
}
