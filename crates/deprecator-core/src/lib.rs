//! Deprecator core
//!
//! Turns a list of archives into jobs and runs them:
//!
//! - [`classify`]: source or binary mode, and the derived output path
//! - [`types`]: jobs, per-job outcomes and the run summary
//! - [`config`]: run-wide settings
//! - [`job`]: runs one job through the matching transformer
//! - [`orchestrator`]: bounded worker pool with per-job failure isolation
//!
//! # Example
//!
//! ```rust,ignore
//! use deprecator_core::{run, ArchiveJob, DeprecatorConfig};
//!
//! let jobs = vec![ArchiveJob::derived("lib.jar"), ArchiveJob::derived("lib-sources.jar")];
//! let summary = run(jobs, DeprecatorConfig::new().with_parallelism(2))?;
//! assert!(summary.is_success());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod classify;
pub mod config;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod types;

pub use classify::{classify, derive_output, DEPRECATED_SUFFIX, SOURCES_SUFFIX};
pub use config::{DeprecatorConfig, DEFAULT_PARALLELISM, SHUTDOWN_GRACE};
pub use error::{DeprecatorError, JobError};
pub use job::run_job;
pub use orchestrator::{Orchestrator, WORKER_THREAD_NAME};
pub use types::{ArchiveJob, JobMode, JobOutcome, JobStatus, RunSummary};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run `jobs` with `config` on a fresh worker pool
///
/// # Errors
/// Returns an error if the configuration is invalid or the pool cannot start
pub fn run(jobs: Vec<ArchiveJob>, config: DeprecatorConfig) -> Result<RunSummary, DeprecatorError> {
    Orchestrator::new(config)?.run(jobs)
}
