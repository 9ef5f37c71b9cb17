//! End-of-job aggregation.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::job::{BatchMatchJob, JobStatus};

/// Top-candidate confidence buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceDistribution {
    /// 80 and above.
    pub high: usize,
    /// 60 to below 80.
    pub medium: usize,
    /// Below 60.
    pub low: usize,
}

impl ConfidenceDistribution {
    fn add(&mut self, score: f64) {
        if score >= 80.0 {
            self.high += 1;
        } else if score >= 60.0 {
            self.medium += 1;
        } else {
            self.low += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub job_id: String,
    pub status: JobStatus,
    pub failure: Option<String>,
    pub total_records: usize,
    pub processed_records: usize,
    pub auto_matched: usize,
    pub manual_review: usize,
    pub no_match: usize,
    pub errors: usize,
    /// Mean top-candidate score over records that had a candidate.
    pub average_confidence: Option<f64>,
    pub distribution: ConfidenceDistribution,
    pub elapsed_seconds: f64,
    pub records_per_second: f64,
    pub needs_review: Vec<String>,
}

/// Summarize a job. Running jobs are measured up to now.
pub fn generate_batch_summary(job: &BatchMatchJob) -> BatchSummary {
    let mut distribution = ConfidenceDistribution::default();
    let mut total = 0.0;
    let mut scored = 0usize;
    for score in job.results.iter().filter_map(|result| result.top_score()) {
        distribution.add(score);
        total += score;
        scored += 1;
    }

    let elapsed_seconds = job.started_at.map_or(0.0, |start| {
        let end = job.finished_at.unwrap_or_else(Utc::now);
        (end - start)
            .num_microseconds()
            .map_or(0.0, |micros| micros.max(0) as f64 / 1_000_000.0)
    });
    let processed = job.progress.processed_records;
    let records_per_second = if elapsed_seconds > 0.0 {
        processed as f64 / elapsed_seconds
    } else {
        0.0
    };

    BatchSummary {
        job_id: job.id.clone(),
        status: job.status,
        failure: job.failure.clone(),
        total_records: job.progress.total_records,
        processed_records: processed,
        auto_matched: job.progress.auto_matched,
        manual_review: job.progress.manual_review_queue,
        no_match: job.progress.no_match_found,
        errors: job.progress.errors,
        average_confidence: (scored > 0).then(|| total / scored as f64),
        distribution,
        elapsed_seconds,
        records_per_second,
        needs_review: job.needs_review().into_iter().map(str::to_string).collect(),
    }
}
