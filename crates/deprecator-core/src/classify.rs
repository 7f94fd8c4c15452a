//! Archive classifier
//!
//! Naming conventions decide a job's mode and its default output path.

use crate::types::JobMode;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Stem suffix marking a source archive (`lib-1.0-sources.jar`)
pub const SOURCES_SUFFIX: &str = "-sources";

/// Stem suffix appended to derived outputs (`lib-1.0-deprecated.jar`)
pub const DEPRECATED_SUFFIX: &str = "-deprecated";

/// Source mode if the file stem ends with `-sources`, binary mode otherwise
#[must_use]
pub fn classify(input: &Path) -> JobMode {
    let is_sources = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(SOURCES_SUFFIX));
    if is_sources {
        JobMode::Source
    } else {
        JobMode::Binary
    }
}

/// Sibling of `input` with `-deprecated` inserted before the extension
#[must_use]
pub fn derive_output(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.file_stem().unwrap_or(input.as_os_str()));
    name.push(DEPRECATED_SUFFIX);
    if let Some(extension) = input.extension() {
        name.push(".");
        name.push(extension);
    }
    input.with_file_name(name)
}
