//! Batch matching jobs.
//!
//! - [`BatchJobRegistry`]: create, run, pause, cancel and inspect jobs
//! - [`BatchMatchConfig`]: auto-match policy and chunking
//! - [`generate_batch_summary`]: counts, confidence distribution, throughput

#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod job;
pub mod policy;
pub mod registry;
pub mod summary;

pub use config::{AutoMatchStrategy, BatchMatchConfig, DuplicateHandling};
pub use control::JobControl;
pub use engine::{BATCH_MATCHER, run_job};
pub use error::{BatchError, RecordError, Result};
pub use job::{
    BatchMatchJob, BatchMatchResult, BatchProgress, JobStatus, MatchDecision, RecordErrorEntry,
};
pub use policy::{Verdict, decide};
pub use registry::BatchJobRegistry;
pub use summary::{BatchSummary, ConfidenceDistribution, generate_batch_summary};
