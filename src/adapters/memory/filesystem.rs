//! In-memory filesystem.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use crate::ports::filesystem::{FileSystem, FsError};

#[derive(Default)]
struct State {
    files: BTreeMap<PathBuf, MemFile>,
    tick: u64,
}

struct MemFile {
    contents: String,
    modified: u64,
}

impl State {
    fn put(&mut self, path: &Path, contents: String) {
        self.tick += 1;
        self.files.insert(path.to_path_buf(), MemFile { contents, modified: self.tick });
    }
}

/// Filesystem held entirely in memory.
///
/// Directories are implied by the files beneath them. Every write advances
/// an internal tick that serves as the modification time, so later writes
/// always look newer.
#[derive(Default)]
pub struct MemFileSystem {
    state: Mutex<State>,
}

impl MemFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, builder style.
    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>, contents: &str) -> Self {
        self.lock().put(path.as_ref(), contents.to_string());
        self
    }

    /// Returns a file's contents, if present.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock().files.get(path.as_ref()).map(|f| f.contents.clone())
    }

    /// All file paths currently stored, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    /// Overrides a file's modification tick.
    pub fn set_modified(&self, path: impl AsRef<Path>, tick: u64) {
        if let Some(file) = self.lock().files.get_mut(path.as_ref()) {
            file.modified = tick;
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(path: &Path) -> FsError {
    format!("File not found: {}", path.display()).into()
}

impl FileSystem for MemFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        self.lock().files.get(path).map(|f| f.contents.clone()).ok_or_else(|| not_found(path))
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        self.lock().put(path, contents.to_string());
        Ok(())
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<(), FsError> {
        let mut state = self.lock();
        let mut contents = state.files.get(path).map(|f| f.contents.clone()).unwrap_or_default();
        contents.push_str(line);
        contents.push('\n');
        state.put(path, contents);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let mut state = self.lock();
        let contents =
            state.files.get(from).map(|f| f.contents.clone()).ok_or_else(|| not_found(from))?;
        state.put(to, contents);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let mut state = self.lock();
        let file = state.files.remove(from).ok_or_else(|| not_found(from))?;
        state.put(to, file.contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.files.contains_key(path)
            || state.files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn modified(&self, path: &Path) -> Result<SystemTime, FsError> {
        let state = self.lock();
        let file = state.files.get(path).ok_or_else(|| not_found(path))?;
        Ok(SystemTime::UNIX_EPOCH + Duration::from_secs(file.modified))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
        let state = self.lock();
        let mut names: Vec<String> = state
            .files
            .keys()
            .filter_map(|k| k.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}
