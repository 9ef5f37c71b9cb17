//! Error types for batch matching jobs.

use linkage_model::ConfigError;
use thiserror::Error;

use crate::job::JobStatus;

/// Errors returned to the caller driving a batch job.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum BatchError {
    /// No job with this id is registered.
    #[error("unknown batch job: {0}")]
    UnknownJob(String),

    /// The requested status change is not an edge of the job state machine.
    #[error("batch job cannot move from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// A batch setting is out of range.
    #[error("invalid batch setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    /// The matching configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A failure confined to one source record. Recorded on the job; never
/// aborts it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The source record has an empty or blank id.
    #[error("source record at position {position} has no id")]
    BlankId { position: usize },

    /// Scoring the record panicked.
    #[error("scoring record {record_id} failed: {message}")]
    ScoringFailed { record_id: String, message: String },
}

impl RecordError {
    /// Id of the offending record, when it has one.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::BlankId { .. } => None,
            Self::ScoringFailed { record_id, .. } => Some(record_id),
        }
    }
}

/// Result type for batch operations.
pub type Result<T> = std::result::Result<T, BatchError>;
