//! The chunked batch loop.
//!
//! Each chunk of source records is scored in parallel. The results are then
//! applied one record at a time on the calling thread, which is the only
//! writer of the job's counters and results. Pause and cancel requests are
//! honoured between chunks.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use linkage_match::{MatchOutcome, SearchOptions, find_matches_with};
use linkage_model::{MatchCandidateResult, MatchResult, MatchingConfig, Record};
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::config::{BatchMatchConfig, DuplicateHandling};
use crate::control::JobControl;
use crate::error::{RecordError, Result};
use crate::job::{BatchMatchJob, BatchMatchResult, BatchProgress, JobStatus, MatchDecision};
use crate::policy::{decide, review_or_reject};

/// `matched_by` stamp on decisions made by the engine.
pub const BATCH_MATCHER: &str = "batch";

/// Run `job` to a terminal status and return its final state.
///
/// Fails only when the job cannot start; everything after that, including
/// an empty input, ends in a status on the job.
pub fn run_job(
    job: &Mutex<BatchMatchJob>,
    sources: &[Record],
    targets: &[Record],
    matching: &MatchingConfig,
    control: &JobControl,
    on_progress: &mut dyn FnMut(&BatchProgress),
) -> Result<BatchMatchJob> {
    let (job_id, config) = {
        let mut state = lock(job);
        state.set_status(JobStatus::Running)?;
        state.algorithm_type = Some(matching.algorithm_type());
        (state.id.clone(), state.config.clone())
    };
    let span = info_span!("batch_job", job_id = %job_id, algorithm = ?matching.algorithm_type());
    let _enter = span.enter();

    let precheck = if targets.is_empty() {
        Some("target pool is empty")
    } else if sources.is_empty() {
        Some("no source records to match")
    } else {
        None
    };
    if let Some(reason) = precheck {
        warn!(reason, "batch job failed before scoring");
        let mut state = lock(job);
        state.fail(reason)?;
        return Ok(state.clone());
    }

    info!(
        sources = sources.len(),
        targets = targets.len(),
        batch_size = config.batch_size,
        strategy = %config.auto_match_strategy,
        "batch job started"
    );

    let options = SearchOptions::default();
    let mut claims = Claims::default();
    let mut cancelled = false;

    for (chunk_index, chunk) in sources.chunks(config.batch_size).enumerate() {
        if !checkpoint(job, control)? {
            cancelled = true;
            break;
        }
        let offset = chunk_index * config.batch_size;
        let scored: Vec<_> = chunk
            .par_iter()
            .enumerate()
            .map(|(i, source)| score_source(offset + i, source, targets, matching, &options))
            .collect();

        for (i, (source, scored)) in chunk.iter().zip(scored).enumerate() {
            let progress = {
                let mut state = lock(job);
                match scored {
                    Ok(candidates) => {
                        let result = resolve(source, candidates, &config, &mut claims);
                        state.record_result(result);
                    }
                    Err(error) => {
                        warn!(position = offset + i, %error, "source record failed");
                        state.record_error(offset + i, &error);
                    }
                }
                state.progress
            };
            on_progress(&progress);
        }
        debug!(chunk = chunk_index, records = chunk.len(), "chunk applied");
    }

    let mut state = lock(job);
    if !cancelled {
        state.set_status(JobStatus::Completed)?;
    }
    info!(
        status = %state.status,
        processed = state.progress.processed_records,
        auto_matched = state.progress.auto_matched,
        manual_review = state.progress.manual_review_queue,
        errors = state.progress.errors,
        "batch job finished"
    );
    Ok(state.clone())
}

/// Honour pause and cancel requests. Returns `false` once cancelled.
fn checkpoint(job: &Mutex<BatchMatchJob>, control: &JobControl) -> Result<bool> {
    if control.is_paused() && !control.is_cancelled() {
        lock(job).set_status(JobStatus::Paused)?;
        info!("batch job paused");
        if control.wait_while_paused() {
            lock(job).set_status(JobStatus::Running)?;
            info!("batch job resumed");
        }
    }
    if control.is_cancelled() {
        lock(job).set_status(JobStatus::Cancelled)?;
        info!("batch job cancelled");
        return Ok(false);
    }
    Ok(true)
}

fn score_source(
    position: usize,
    source: &Record,
    targets: &[Record],
    matching: &MatchingConfig,
    options: &SearchOptions,
) -> std::result::Result<Vec<MatchCandidateResult>, RecordError> {
    if source.id.trim().is_empty() {
        return Err(RecordError::BlankId { position });
    }
    panic::catch_unwind(AssertUnwindSafe(|| {
        find_matches_with(source, targets, matching, options)
    }))
    .map(MatchOutcome::into_candidates)
    .map_err(|payload| RecordError::ScoringFailed {
        record_id: source.id.clone(),
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "scorer panicked".to_string()
    }
}

/// Target id -> source id that first auto-accepted it.
type Claims = HashMap<String, String>;

/// Decide on the full ranked list, then keep `max_matches_per_record`.
fn resolve(
    source: &Record,
    mut candidates: Vec<MatchCandidateResult>,
    config: &BatchMatchConfig,
    claims: &mut Claims,
) -> BatchMatchResult {
    let verdict = decide(&candidates, config);
    let mut decision = verdict.decision;
    let mut duplicate_of = None;
    let mut accepted = Vec::with_capacity(verdict.accepted.len());

    for index in verdict.accepted.into_iter().take(config.max_matches_per_record) {
        let target = &candidates[index].candidate_record_id;
        if let Some(earlier) = claims.get(target) {
            match config.handle_duplicates {
                DuplicateHandling::Skip => {
                    debug!(source_id = %source.id, target_id = %target, "target already claimed; skipped");
                    continue;
                }
                DuplicateHandling::Merge => {
                    duplicate_of.get_or_insert_with(|| earlier.clone());
                }
                DuplicateHandling::KeepAll => {}
            }
        }
        accepted.push(index);
    }

    if decision == MatchDecision::AutoMatched && accepted.is_empty() {
        decision = review_or_reject(candidates.first().map(|c| c.score), config);
    }
    for &index in &accepted {
        claims
            .entry(candidates[index].candidate_record_id.clone())
            .or_insert_with(|| source.id.clone());
    }

    let match_results = match decision {
        MatchDecision::AutoMatched => accepted
            .iter()
            .map(|&index| MatchResult::matched(source.id.as_str(), &candidates[index], BATCH_MATCHER))
            .collect(),
        MatchDecision::ManualReview => candidates
            .first()
            .map(|top| MatchResult::manual_review(source.id.as_str(), top, BATCH_MATCHER))
            .into_iter()
            .collect(),
        MatchDecision::NoMatch => Vec::new(),
    };
    candidates.truncate(config.max_matches_per_record);

    BatchMatchResult {
        source_id: source.id.clone(),
        decision,
        candidates,
        match_results,
        duplicate_of,
    }
}

fn lock(job: &Mutex<BatchMatchJob>) -> MutexGuard<'_, BatchMatchJob> {
    job.lock().unwrap_or_else(PoisonError::into_inner)
}
