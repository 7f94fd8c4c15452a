//! Job and outcome types

use crate::classify::{classify, derive_output};
use deprecator_transform::ArchiveReport;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How an archive is transformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    /// Compiled code units
    Binary,
    /// Source units
    Source,
}

impl std::fmt::Display for JobMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => f.write_str("binary"),
            Self::Source => f.write_str("source"),
        }
    }
}

/// One archive to transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveJob {
    input: PathBuf,
    output: PathBuf,
    mode: JobMode,
    message: Option<String>,
}

impl ArchiveJob {
    /// Job for `input`; without an explicit `output` one is derived next to the input
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, output: Option<PathBuf>) -> Self {
        let input = input.into();
        let output = output.unwrap_or_else(|| derive_output(&input));
        Self {
            mode: classify(&input),
            input,
            output,
            message: None,
        }
    }

    /// Job with a derived output path
    #[inline]
    #[must_use]
    pub fn derived(input: impl Into<PathBuf>) -> Self {
        Self::new(input, None)
    }

    /// Job with an explicit output path, used verbatim
    #[inline]
    #[must_use]
    pub fn explicit(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self::new(input, Some(output.into()))
    }

    /// Documentation message for this job, overriding the run-wide one
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &Path {
        &self.input
    }

    #[inline]
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> JobMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// How a job ended
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Succeeded { report: ArchiveReport },
    Failed { error: String },
}

/// Result of one job
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: JobMode,
    /// Processing time; for a panicked worker, time since the job was scheduled
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub status: JobStatus,
}

impl JobOutcome {
    #[must_use]
    pub fn succeeded(job: &ArchiveJob, elapsed_ms: u64, report: ArchiveReport) -> Self {
        Self::from_job(job, elapsed_ms, JobStatus::Succeeded { report })
    }

    #[must_use]
    pub fn failed(job: &ArchiveJob, elapsed_ms: u64, error: impl ToString) -> Self {
        Self::from_job(job, elapsed_ms, JobStatus::Failed { error: error.to_string() })
    }

    fn from_job(job: &ArchiveJob, elapsed_ms: u64, status: JobStatus) -> Self {
        Self {
            input: job.input.clone(),
            output: job.output.clone(),
            mode: job.mode,
            elapsed_ms,
            status,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded { .. })
    }

    /// Report of a successful job
    #[must_use]
    pub fn report(&self) -> Option<&ArchiveReport> {
        match &self.status {
            JobStatus::Succeeded { report } => Some(report),
            JobStatus::Failed { .. } => None,
        }
    }

    /// Error text of a failed job
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            JobStatus::Succeeded { .. } => None,
            JobStatus::Failed { error } => Some(error),
        }
    }
}

/// Outcomes of a whole run, in submission order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub jobs: Vec<JobOutcome>,
}

impl RunSummary {
    /// Record one outcome
    pub fn push(&mut self, outcome: JobOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.jobs.push(outcome);
    }

    /// Whether every job succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
