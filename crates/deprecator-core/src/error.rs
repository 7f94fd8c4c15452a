//! Error types for Deprecator Core
//!
//! Provides error handling for:
//! - Per-job failures, which never escape their job
//! - Startup and configuration failures, which stop the run before scheduling

use deprecator_transform::TransformError;

/// Failure of a single archive job
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The transformer rejected or failed on the archive
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The worker running the job panicked
    #[error("worker panicked: {0}")]
    Panicked(String),

    /// The worker was cancelled before the job settled
    #[error("worker cancelled before completion")]
    Cancelled,
}

/// Failures that prevent a run from starting
#[derive(Debug, thiserror::Error)]
pub enum DeprecatorError {
    /// Worker pool size of zero
    #[error("parallelism must be at least 1")]
    InvalidParallelism,

    /// Nothing to do
    #[error("no archives given")]
    NoJobs,

    /// Worker pool could not be created
    #[error("failed to start worker pool: {0}")]
    Runtime(#[source] std::io::Error),

    /// Malformed command input
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<tokio::task::JoinError> for JobError {
    fn from(error: tokio::task::JoinError) -> Self {
        if !error.is_panic() {
            return Self::Cancelled;
        }
        let payload = error.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_errors_display_unchanged() {
        let inner = TransformError::SameInputOutput("/tmp/a.jar".into());
        let expected = inner.to_string();
        assert_eq!(JobError::from(inner).to_string(), expected);
    }

    #[tokio::test]
    async fn panics_become_job_errors() {
        let handle = tokio::task::spawn_blocking(|| panic!("exploded"));
        let err = JobError::from(handle.await.unwrap_err());
        assert!(matches!(err, JobError::Panicked(ref m) if m == "exploded"));
    }
}
