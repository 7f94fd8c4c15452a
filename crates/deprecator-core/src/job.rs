//! Per-job dispatch
//!
//! Builds the transformer a job's mode calls for and runs the matching
//! archive pipeline. Everything a job needs is created here, so jobs share no
//! mutable state.

use crate::config::DeprecatorConfig;
use crate::error::JobError;
use crate::types::{ArchiveJob, JobMode};
use deprecator_transform::{
    ensure_distinct, process_binary_archive, process_source_archive, ArchiveReport, BinaryTransformer,
    ClasspathHierarchy, SourceTransformer,
};
use std::sync::Arc;

/// Run one job to completion on the calling thread
///
/// # Errors
/// Any failure of the job's pipeline; nothing is retried
pub fn run_job(job: &ArchiveJob, config: &DeprecatorConfig) -> Result<ArchiveReport, JobError> {
    ensure_distinct(job.input(), job.output())?;

    let report = match job.mode() {
        JobMode::Binary => {
            let hierarchy = ClasspathHierarchy::build(job.input(), &config.classpath, config.class_format)?;
            tracing::debug!("Type hierarchy for {} holds {} classes", job.input().display(), hierarchy.len());
            let transformer = BinaryTransformer::new(config.class_format, Arc::new(hierarchy));
            process_binary_archive(job.input(), job.output(), &transformer)?
        }
        JobMode::Source => {
            let message = job.message().or(config.message.as_deref());
            let transformer = SourceTransformer::new(message)
                .with_kinds(config.kinds.clone())
                .with_java_release(config.java_release);
            process_source_archive(job.input(), job.output(), &transformer)?
        }
    };
    Ok(report)
}
