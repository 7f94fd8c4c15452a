//! Error type returned by every transformer call
//!
//! Covers:
//! - Malformed code units (binary mode)
//! - Archive container read/write failures
//! - Scratch-directory and file I/O
//! - Source parser failures

use deprecator_classfile::ClassFileError;
use std::path::PathBuf;

/// Errors that abort the archive job they occur in
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A code unit could not be parsed or re-serialized
    #[error("malformed code unit {unit}: {source}")]
    ClassFile {
        unit: String,
        #[source]
        source: ClassFileError,
    },

    /// Archive container could not be read or written
    #[error("archive error in {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Filesystem failure
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive entry name escapes the extraction root
    #[error("archive {archive} contains an unsafe entry name: {name}")]
    UnsafeEntryName { archive: PathBuf, name: String },

    /// Input and output archive resolve to the same file
    #[error("input and output are the same file: {0}")]
    SameInputOutput(PathBuf),

    /// Source grammar could not be loaded
    #[error("source parser initialization failed: {0}")]
    ParserInit(String),

    /// Source parser produced no tree
    #[error("failed to parse source unit {unit}")]
    SourceParse { unit: String },
}

impl TransformError {
    /// Create a code-unit error
    pub fn class_file(unit: impl Into<String>, source: ClassFileError) -> Self {
        Self::ClassFile {
            unit: unit.into(),
            source,
        }
    }

    /// Create an archive error for path
    pub fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }

    /// Create an IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for transformer operations
pub type TransformResult<T> = Result<T, TransformError>;
