//! Output files are written with the write-rename pattern.
//!
//! Data goes to `{path}.tmp`, is flushed with `sync_all()`, then renamed
//! over the final path, so an interrupted run leaves either the previous
//! file or the new one and never a partial write. [`stage_write`] splits
//! the two steps for callers producing several files at once.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// An output written to its temp sibling, waiting to be renamed into place.
///
/// Dropping it without [`StagedWrite::commit`] removes the temp file, so
/// several outputs can be staged and only renamed once all of them exist.
#[derive(Debug)]
#[must_use = "a staged write does nothing until committed"]
pub struct StagedWrite {
    path: PathBuf,
    tmp: PathBuf,
    bytes: usize,
    committed: bool,
}

impl StagedWrite {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temp file over the final path.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.path).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        self.committed = true;
        debug!(path = %self.path.display(), bytes = self.bytes, "wrote output");
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

/// Write `data` next to `path` and sync it, creating parent directories.
/// Nothing is visible at `path` until the returned write is committed.
pub fn stage_write(path: &Path, data: &[u8]) -> Result<StagedWrite> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let staged = StagedWrite {
        path: path.to_path_buf(),
        tmp: tmp_path(path),
        bytes: data.len(),
        committed: false,
    };
    let mut file = File::create(&staged.tmp).map_err(write_err)?;
    file.write_all(data).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    Ok(staged)
}

/// Atomically replace `path` with `data`, creating parent directories.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    stage_write(path, data)?.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/grid.csv");
        atomic_write(&path, b"bed_id\n1\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"bed_id\n1\n");
        assert!(!tmp_path(&path).exists(), "temp file should be renamed away");
    }

    #[test]
    fn overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.svg");
        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"two");
    }

    #[test]
    fn unwritable_parent_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let err = atomic_write(&blocker.join("grid.csv"), b"data").unwrap_err();
        assert!(matches!(err, Error::Write { .. }), "expected Write, got: {err}");
    }

    #[test]
    fn staged_write_is_invisible_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        let staged = stage_write(&path, b"bed_id\n").unwrap();
        assert!(!path.exists());
        assert!(tmp_path(&path).exists());
        assert_eq!(staged.path(), path);
        staged.commit().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"bed_id\n");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn dropped_staged_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.svg");
        drop(stage_write(&path, b"<svg/>").unwrap());
        assert!(!path.exists());
        assert!(!tmp_path(&path).exists());
    }
}
