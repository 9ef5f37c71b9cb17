//! Batch job state: status machine, progress counters and per-record results.

use chrono::{DateTime, Utc};
use linkage_model::{AlgorithmType, MatchCandidateResult, MatchResult, MatchStatus};
use serde::{Deserialize, Serialize};

use crate::config::BatchMatchConfig;
use crate::error::{BatchError, RecordError, Result};

// ============================================================================
// Status
// ============================================================================

/// Lifecycle of a batch job.
///
/// `Pending -> Running -> {Completed | Cancelled | Error}`, with
/// `Running <-> Paused`, `Paused -> Cancelled` and `Pending -> Cancelled`
/// for a job withdrawn before it runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Paused,
    Completed,
    Cancelled,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Error)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running | Self::Cancelled)
                | (Self::Running, Self::Completed | Self::Cancelled | Self::Error | Self::Paused)
                | (Self::Paused, Self::Running | Self::Cancelled)
        )
    }

    /// Validate a status change.
    pub fn transition(self, next: Self) -> Result<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(BatchError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Counters updated after every source record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub total_records: usize,
    pub processed_records: usize,
    pub auto_matched: usize,
    pub manual_review_queue: usize,
    pub no_match_found: usize,
    pub errors: usize,
}

impl BatchProgress {
    /// Processed share of the job, 0.0 to 1.0.
    pub fn fraction(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        self.processed_records as f64 / self.total_records as f64
    }
}

// ============================================================================
// Results
// ============================================================================

/// What the policy decided for one source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchDecision {
    AutoMatched,
    ManualReview,
    NoMatch,
}

/// Outcome for one source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMatchResult {
    pub source_id: String,
    pub decision: MatchDecision,
    /// Ranked candidates, at most `maxMatchesPerRecord`.
    pub candidates: Vec<MatchCandidateResult>,
    /// Decision records: one per accepted target, or one review entry.
    pub match_results: Vec<MatchResult>,
    /// Earlier source record that already claimed an accepted target.
    pub duplicate_of: Option<String>,
}

impl BatchMatchResult {
    pub fn top_score(&self) -> Option<f64> {
        self.candidates.first().map(|candidate| candidate.score)
    }

    /// Ids of the targets accepted for this record.
    pub fn accepted_ids(&self) -> impl Iterator<Item = &str> {
        self.match_results
            .iter()
            .filter(|result| result.status == MatchStatus::Matched)
            .filter_map(|result| result.match_id.as_deref())
    }
}

/// A record-level failure as stored on the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordErrorEntry {
    /// Position of the record in the source list.
    pub position: usize,
    pub record_id: Option<String>,
    pub message: String,
}

impl RecordErrorEntry {
    pub fn new(position: usize, error: &RecordError) -> Self {
        Self {
            position,
            record_id: error.record_id().map(str::to_string),
            message: error.to_string(),
        }
    }
}

// ============================================================================
// Job
// ============================================================================

/// A batch job. Mutated only by the engine while running; frozen once
/// its status is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMatchJob {
    pub id: String,
    pub config: BatchMatchConfig,
    pub status: JobStatus,
    pub progress: BatchProgress,
    pub results: Vec<BatchMatchResult>,
    pub errors: Vec<RecordErrorEntry>,
    /// Why the job ended in [`JobStatus::Error`].
    pub failure: Option<String>,
    pub algorithm_type: Option<AlgorithmType>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchMatchJob {
    pub fn new(id: impl Into<String>, config: BatchMatchConfig, total_records: usize) -> Self {
        Self {
            id: id.into(),
            config,
            status: JobStatus::Pending,
            progress: BatchProgress {
                total_records,
                ..BatchProgress::default()
            },
            results: Vec::new(),
            errors: Vec::new(),
            failure: None,
            algorithm_type: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Move to `next`, stamping start and finish times.
    pub fn set_status(&mut self, next: JobStatus) -> Result<()> {
        self.status = self.status.transition(next)?;
        if next == JobStatus::Running && self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    /// End the job in [`JobStatus::Error`] with a reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.set_status(JobStatus::Error)?;
        self.failure = Some(reason.into());
        Ok(())
    }

    pub(crate) fn record_result(&mut self, result: BatchMatchResult) {
        self.progress.processed_records += 1;
        match result.decision {
            MatchDecision::AutoMatched => self.progress.auto_matched += 1,
            MatchDecision::ManualReview => self.progress.manual_review_queue += 1,
            MatchDecision::NoMatch => self.progress.no_match_found += 1,
        }
        self.results.push(result);
    }

    pub(crate) fn record_error(&mut self, position: usize, error: &RecordError) {
        self.progress.processed_records += 1;
        self.progress.errors += 1;
        self.errors.push(RecordErrorEntry::new(position, error));
    }

    /// Source ids queued for a reviewer, in processing order.
    pub fn needs_review(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|result| result.decision == MatchDecision::ManualReview)
            .map(|result| result.source_id.as_str())
            .collect()
    }
}
