//! Scratch-space manager
//!
//! Staging directories for unpacking and repacking source archives. A
//! [`ScratchDir`] is removed recursively when dropped, on success and failure
//! paths alike.

use crate::error::{TransformError, TransformResult};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Suffix appended to an archive path to name its scratch directory
pub const SCRATCH_SUFFIX: &str = ".dir";

/// Scratch directory derived from an archive path, e.g. `lib.jar` -> `lib.jar.dir`
#[must_use]
pub fn scratch_path(archive: &Path) -> PathBuf {
    let mut name = OsString::from(archive.as_os_str());
    name.push(SCRATCH_SUFFIX);
    PathBuf::from(name)
}

/// Remove a file or directory tree; a missing path is not an error
///
/// # Errors
/// Fails when the path exists but cannot be removed
pub fn delete_recursively(path: &Path) -> TransformResult<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };
    match result {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(TransformError::io_error(path, e)),
        _ => Ok(()),
    }
}

/// A freshly created directory removed on drop
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create `path`, removing any stale copy first
    ///
    /// # Errors
    /// Fails when a stale copy cannot be removed or the directory cannot be created
    pub fn create(path: impl Into<PathBuf>) -> TransformResult<Self> {
        let path = path.into();
        delete_recursively(&path)?;
        fs::create_dir_all(&path).map_err(|e| TransformError::io_error(&path, e))?;
        tracing::debug!("Created scratch directory {}", path.display());
        Ok(Self { path })
    }

    /// Scratch directory next to `archive`
    ///
    /// # Errors
    /// See [`ScratchDir::create`]
    pub fn for_archive(archive: &Path) -> TransformResult<Self> {
        Self::create(scratch_path(archive))
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = delete_recursively(&self.path) {
            tracing::warn!("Failed to remove scratch directory: {}", e);
        }
    }
}

/// Convert a directory-walk failure into a transform error
pub(crate) fn walk_error(root: &Path, error: walkdir::Error) -> TransformError {
    let path = error.path().unwrap_or(root).to_path_buf();
    TransformError::io_error(path, error.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_path_appends_suffix() {
        assert_eq!(scratch_path(Path::new("/out/lib-sources.jar")), PathBuf::from("/out/lib-sources.jar.dir"));
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("lib.jar");
        let path = {
            let scratch = ScratchDir::for_archive(&archive).unwrap();
            fs::create_dir_all(scratch.path().join("a/b")).unwrap();
            fs::write(scratch.path().join("a/b/C.java"), "class C {}").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn stale_copy_is_replaced() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("stale.dir");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("leftover.txt"), "old").unwrap();

        let scratch = ScratchDir::create(&path).unwrap();
        assert!(scratch.path().exists());
        assert!(!scratch.path().join("leftover.txt").exists());
    }

    #[test]
    fn deleting_missing_path_is_ok() {
        let temp = tempfile::tempdir().unwrap();
        assert!(delete_recursively(&temp.path().join("missing")).is_ok());
    }
}
