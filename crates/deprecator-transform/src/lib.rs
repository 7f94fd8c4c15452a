//! Deprecator transformers
//!
//! Everything that turns an archive into its deprecated counterpart:
//!
//! - [`marker`]: whether a declaration needs a marker, and what the marker is
//! - [`binary`]: marks compiled code units
//! - [`hierarchy`]: classpath-aware type hierarchy for override metadata
//! - [`source`]: marks declarations in source units
//! - [`scratch`]: self-removing staging directories
//! - [`pipeline`]: archive-in, archive-out drivers for both modes
//!
//! # Example
//!
//! ```rust,ignore
//! use deprecator_transform::{process_source_archive, SourceTransformer};
//!
//! let transformer = SourceTransformer::new(Some("Use the v2 API."));
//! let report = process_source_archive(input, output, &transformer)?;
//! println!("{} declarations marked", report.declarations.newly_marked());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod binary;
pub mod error;
pub mod hierarchy;
pub mod marker;
pub mod pipeline;
pub mod report;
pub mod scratch;
pub mod source;

pub use binary::{is_code_unit, BinaryTransformer, CodeUnit};
pub use error::{TransformError, TransformResult};
pub use hierarchy::{ClassInfo, ClasspathHierarchy, InheritanceProvider, MethodSignature};
pub use marker::{build_marker, should_mark, DocTag, Marker, MarkerMode, DEFAULT_MESSAGE, DEPRECATED_DESCRIPTOR};
pub use pipeline::{ensure_distinct, process_binary_archive, process_source_archive};
pub use report::{ArchiveReport, Category, MarkCounts, UnitReport};
pub use scratch::{delete_recursively, scratch_path, ScratchDir};
pub use source::{is_source_unit, DeclarationKind, KindError, KindFilter, SourceTransformer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
