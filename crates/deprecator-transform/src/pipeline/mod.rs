//! Archive pipelines
//!
//! One function per mode, each turning an input archive into an output
//! archive:
//!
//! - [`process_binary_archive`]: streams entries, rewriting code units in place
//! - [`process_source_archive`]: extract to scratch, rewrite, repack

mod binary;
mod source;

pub use binary::process_binary_archive;
pub use source::process_source_archive;

use crate::error::{TransformError, TransformResult};
use crate::scratch::delete_recursively;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::CompressionMethod;

/// Reject jobs whose output would overwrite their input
///
/// # Errors
/// Returns [`TransformError::SameInputOutput`] when both paths name one file
pub fn ensure_distinct(input: &Path, output: &Path) -> TransformResult<()> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        return Err(TransformError::SameInputOutput(input.to_path_buf()));
    }
    Ok(())
}

/// Compression for rewritten entries: stored stays stored, anything else deflates
pub(crate) fn rewrite_compression(original: CompressionMethod) -> CompressionMethod {
    match original {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

/// Output archive that is deleted unless the job commits it
pub(crate) struct PendingOutput {
    path: PathBuf,
    committed: bool,
}

impl PendingOutput {
    /// Remove a stale output and create a fresh file
    pub(crate) fn create(path: &Path) -> TransformResult<(Self, File)> {
        delete_recursively(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TransformError::io_error(parent, e))?;
        }
        let file = File::create(path).map_err(|e| TransformError::io_error(path, e))?;
        Ok((
            Self {
                path: path.to_path_buf(),
                committed: false,
            },
            file,
        ))
    }

    pub(crate) fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingOutput {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        tracing::debug!("Removing partial output {}", self.path.display());
        if let Err(e) = delete_recursively(&self.path) {
            tracing::warn!("Failed to remove partial output: {}", e);
        }
    }
}
