//! Caller-owned registry of batch jobs.
//!
//! The registry holds each job's inputs, state and control handle. Runs are
//! synchronous on the calling thread; other threads may pause, cancel or
//! snapshot a job while it runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use linkage_model::{AlgorithmType, MatchingConfig, Record};
use tracing::info;

use crate::config::BatchMatchConfig;
use crate::control::JobControl;
use crate::engine::run_job;
use crate::error::{BatchError, Result};
use crate::job::{BatchMatchJob, BatchProgress, JobStatus};
use crate::summary::{BatchSummary, generate_batch_summary};

struct JobEntry {
    state: Mutex<BatchMatchJob>,
    sources: Vec<Record>,
    targets: Vec<Record>,
    control: JobControl,
}

impl JobEntry {
    fn state(&self) -> MutexGuard<'_, BatchMatchJob> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
pub struct BatchJobRegistry {
    jobs: Mutex<HashMap<String, Arc<JobEntry>>>,
    next_id: AtomicUsize,
}

impl BatchJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending job and return its id.
    pub fn create_batch_match_job(
        &self,
        sources: Vec<Record>,
        targets: Vec<Record>,
        config: BatchMatchConfig,
    ) -> Result<String> {
        config.validate()?;
        let id = format!("batch-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let entry = JobEntry {
            state: Mutex::new(BatchMatchJob::new(id.clone(), config, sources.len())),
            sources,
            targets,
            control: JobControl::new(),
        };
        info!(job_id = %id, sources = entry.sources.len(), targets = entry.targets.len(), "batch job created");
        self.jobs().insert(id.clone(), Arc::new(entry));
        Ok(id)
    }

    /// Run a pending job to completion on the calling thread.
    ///
    /// `on_progress` sees the counters after every record; `on_complete`
    /// sees the final job once it reaches a terminal status.
    pub fn run_batch_match_job<P, C>(
        &self,
        job_id: &str,
        matching_config: &MatchingConfig,
        algorithm_type: AlgorithmType,
        mut on_progress: P,
        on_complete: C,
    ) -> Result<BatchMatchJob>
    where
        P: FnMut(&BatchProgress),
        C: FnOnce(&BatchMatchJob),
    {
        let entry = self.entry(job_id)?;
        let matching = matching_config.clone().with_algorithm(algorithm_type);
        matching.validate()?;
        let finished = run_job(
            &entry.state,
            &entry.sources,
            &entry.targets,
            &matching,
            &entry.control,
            &mut on_progress,
        )?;
        on_complete(&finished);
        Ok(finished)
    }

    /// Cancel a job.
    ///
    /// A pending job is withdrawn at once and can no longer be run. A
    /// running or paused job stops at the next chunk boundary.
    pub fn cancel_batch_job(&self, job_id: &str) -> Result<()> {
        let entry = self.entry(job_id)?;
        let mut state = entry.state();
        let status = state.status;
        match status {
            JobStatus::Pending => {
                state.set_status(JobStatus::Cancelled)?;
                entry.control.cancel();
                info!(job_id, "pending batch job withdrawn");
                Ok(())
            }
            JobStatus::Running | JobStatus::Paused => {
                entry.control.cancel();
                Ok(())
            }
            _ => Err(BatchError::InvalidTransition {
                from: status,
                to: JobStatus::Cancelled,
            }),
        }
    }

    /// Ask a running job to pause at the next chunk boundary.
    pub fn pause_batch_job(&self, job_id: &str) -> Result<()> {
        let entry = self.entry(job_id)?;
        let status = entry.state().status;
        if status != JobStatus::Running || entry.control.is_paused() {
            return Err(BatchError::InvalidTransition {
                from: status,
                to: JobStatus::Paused,
            });
        }
        entry.control.pause();
        Ok(())
    }

    pub fn resume_batch_job(&self, job_id: &str) -> Result<()> {
        let entry = self.entry(job_id)?;
        let status = entry.state().status;
        let pausing = matches!(status, JobStatus::Running | JobStatus::Paused);
        if !pausing || !entry.control.is_paused() {
            return Err(BatchError::InvalidTransition {
                from: status,
                to: JobStatus::Running,
            });
        }
        entry.control.resume();
        Ok(())
    }

    /// Snapshot of a job.
    pub fn get_batch_job(&self, job_id: &str) -> Option<BatchMatchJob> {
        self.entry(job_id).ok().map(|entry| entry.state().clone())
    }

    pub fn generate_batch_summary(&self, job_id: &str) -> Result<BatchSummary> {
        let entry = self.entry(job_id)?;
        let state = entry.state();
        Ok(generate_batch_summary(&state))
    }

    /// Control handle for a job, for callers that run it elsewhere.
    pub fn control(&self, job_id: &str) -> Option<JobControl> {
        self.entry(job_id).ok().map(|entry| entry.control.clone())
    }

    pub fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.jobs().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn entry(&self, job_id: &str) -> Result<Arc<JobEntry>> {
        self.jobs()
            .get(job_id)
            .cloned()
            .ok_or_else(|| BatchError::UnknownJob(job_id.to_string()))
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<String, Arc<JobEntry>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for BatchJobRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchJobRegistry")
            .field("jobs", &self.job_ids())
            .finish()
    }
}
