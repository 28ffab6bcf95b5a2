//! Live filesystem adapter using `std::fs`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use crate::ports::filesystem::{FileSystem, FsError};

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

fn ensure_parent(path: &Path) -> Result<(), FsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

impl FileSystem for LiveFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        Ok(fs::read_to_string(path)?)
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        ensure_parent(path)?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| format!("invalid file path for atomic write: {}", path.display()))?;
        let tmp = path.with_file_name(format!(
            ".{file_name}.tmp.{}.{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<(), FsError> {
        ensure_parent(path)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        file.sync_data()?;
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        ensure_parent(to)?;
        fs::copy(from, to)?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        ensure_parent(to)?;
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            // Cross-device moves cannot be renamed; copy then unlink.
            Err(_) if from.is_file() => {
                fs::copy(from, to)?;
                fs::remove_file(from)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn modified(&self, path: &Path) -> Result<SystemTime, FsError> {
        Ok(fs::metadata(path)?.modified()?)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("adverts.json");

        LiveFileSystem.write_atomic(&path, "[]\n").unwrap();
        LiveFileSystem.write_atomic(&path, "[1]\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[1]\n");
        let names = LiveFileSystem.list_dir(&dir.path().join("nested")).unwrap();
        assert_eq!(names, vec!["adverts.json"]);
    }

    #[test]
    fn append_line_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.undo");

        LiveFileSystem.append_line(&path, "a|b").unwrap();
        LiveFileSystem.append_line(&path, "c|d").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a|b\nc|d\n");
    }

    #[test]
    fn rename_creates_destination_parents() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.txt");
        let to = dir.path().join("dead").join("sub").join("a.txt");
        fs::write(&from, "ad").unwrap();

        LiveFileSystem.rename(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "ad");
    }

    #[test]
    fn rename_missing_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            LiveFileSystem.rename(&dir.path().join("missing"), &dir.path().join("elsewhere"));
        assert!(result.is_err());
    }
}
