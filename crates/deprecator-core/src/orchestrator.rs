//! Job orchestrator
//!
//! Fans archive jobs out to a bounded pool of blocking workers:
//! - exactly `parallelism` workers, named `task-executor`
//! - a failed or panicked job is logged and recorded, never propagated
//! - the calling thread blocks until every job has settled
//! - shutdown waits up to the grace period, then abandons stuck workers

use crate::config::DeprecatorConfig;
use crate::error::{DeprecatorError, JobError};
use crate::job::run_job;
use crate::types::{ArchiveJob, JobOutcome, RunSummary};
use deprecator_transform::ArchiveReport;
use std::sync::Arc;
use std::time::Instant;

/// Name given to every worker thread
pub const WORKER_THREAD_NAME: &str = "task-executor";

/// Runs archive jobs on a bounded worker pool
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Arc<DeprecatorConfig>,
}

impl Orchestrator {
    /// Create an orchestrator
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid
    pub fn new(config: DeprecatorConfig) -> Result<Self, DeprecatorError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DeprecatorConfig {
        &self.config
    }

    /// Run every job and report each outcome
    ///
    /// # Errors
    /// Only fails when the worker pool cannot be started; job failures are
    /// part of the returned summary
    pub fn run(&self, jobs: Vec<ArchiveJob>) -> Result<RunSummary, DeprecatorError> {
        self.dispatch(jobs, run_job)
    }

    pub(crate) fn dispatch<F>(&self, jobs: Vec<ArchiveJob>, work: F) -> Result<RunSummary, DeprecatorError>
    where
        F: Fn(&ArchiveJob, &DeprecatorConfig) -> Result<ArchiveReport, JobError> + Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(self.config.parallelism)
            .thread_name(WORKER_THREAD_NAME)
            .build()
            .map_err(DeprecatorError::Runtime)?;

        tracing::info!(
            "Scheduling {} jobs on {} workers",
            jobs.len(),
            self.config.parallelism
        );

        let work = Arc::new(work);
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let config = Arc::clone(&self.config);
                let work = Arc::clone(&work);
                let task_job = job.clone();
                let scheduled = Instant::now();
                let handle = runtime.spawn_blocking(move || execute(&task_job, &config, work.as_ref()));
                (job, scheduled, handle)
            })
            .collect();

        let summary = runtime.block_on(async {
            let mut summary = RunSummary::default();
            for (job, scheduled, handle) in handles {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(join_error) => {
                        let error = JobError::from(join_error);
                        tracing::error!("Failed to process {}: {}", job.input().display(), error);
                        JobOutcome::failed(&job, elapsed_ms(scheduled), error)
                    }
                };
                summary.push(outcome);
            }
            summary
        });

        runtime.shutdown_timeout(self.config.shutdown_grace);
        tracing::info!(
            "Finished {} jobs: {} succeeded, {} failed",
            summary.jobs.len(),
            summary.succeeded,
            summary.failed
        );
        Ok(summary)
    }
}

/// Run one job on the current worker, logging how it ended
fn execute<F>(job: &ArchiveJob, config: &DeprecatorConfig, work: &F) -> JobOutcome
where
    F: Fn(&ArchiveJob, &DeprecatorConfig) -> Result<ArchiveReport, JobError>,
{
    tracing::info!("Processing {}", job.input().display());
    let started = Instant::now();

    match work(job, config) {
        Ok(report) => {
            let elapsed = elapsed_ms(started);
            tracing::info!(
                "Successfully processed {} in {}ms -> {}",
                job.input().display(),
                elapsed,
                job.output().display()
            );
            JobOutcome::succeeded(job, elapsed, report)
        }
        Err(e) => {
            tracing::error!("Failed to process {}: {}", job.input().display(), e);
            JobOutcome::failed(job, elapsed_ms(started), e)
        }
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn jobs(count: usize) -> Vec<ArchiveJob> {
        (0..count).map(|i| ArchiveJob::derived(format!("job-{i}.jar"))).collect()
    }

    #[test]
    fn panicking_job_is_isolated() {
        let orchestrator = Orchestrator::new(DeprecatorConfig::new().with_parallelism(2)).unwrap();
        let summary = orchestrator
            .dispatch(jobs(3), |job, _| {
                if job.input().ends_with("job-1.jar") {
                    panic!("corrupt state");
                }
                Ok(ArchiveReport::default())
            })
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.jobs[0].is_success());
        assert!(summary.jobs[1].error().unwrap().contains("corrupt state"));
        assert!(summary.jobs[2].is_success());
    }

    #[test]
    fn workers_are_named_and_bounded() {
        let orchestrator = Orchestrator::new(DeprecatorConfig::new().with_parallelism(2)).unwrap();
        let names = Arc::new(Mutex::new(HashSet::new()));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (names_in, running_in, peak_in) = (Arc::clone(&names), Arc::clone(&running), Arc::clone(&peak));
        let summary = orchestrator
            .dispatch(jobs(6), move |_, _| {
                let now = running_in.fetch_add(1, Ordering::SeqCst) + 1;
                peak_in.fetch_max(now, Ordering::SeqCst);
                if let Some(name) = std::thread::current().name() {
                    names_in.lock().unwrap().insert(name.to_string());
                }
                std::thread::sleep(Duration::from_millis(20));
                running_in.fetch_sub(1, Ordering::SeqCst);
                Ok(ArchiveReport::default())
            })
            .unwrap();

        assert!(summary.is_success());
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(*names.lock().unwrap(), HashSet::from([WORKER_THREAD_NAME.to_string()]));
    }

    #[test]
    fn empty_run_succeeds() {
        let orchestrator = Orchestrator::new(DeprecatorConfig::new()).unwrap();
        let summary = orchestrator.run(Vec::new()).unwrap();
        assert!(summary.is_success());
        assert!(summary.jobs.is_empty());
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let result = Orchestrator::new(DeprecatorConfig::new().with_parallelism(0));
        assert!(matches!(result, Err(DeprecatorError::InvalidParallelism)));
    }
}
