//! Match orchestration: score a candidate pool for one source record.
//!
//! The engine skips the source itself, scores every remaining candidate in
//! parallel, drops candidates below the minimum score and ranks the rest by
//! descending score. Ties keep pool order, so rankings are reproducible.

use linkage_model::{AlgorithmType, MatchCandidateResult, MatchingConfig, Record};
use rayon::prelude::*;
use tracing::debug;

use crate::classify::classify;
use crate::deterministic::DeterministicScorer;
use crate::scorer::{Scorer, scorer_for};

/// Caller overrides for a search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchOptions {
    /// Minimum score to keep; defaults to `threshold().low()`.
    pub min_score: Option<f64>,
    /// Keep at most this many ranked candidates.
    pub limit: Option<usize>,
}

impl SearchOptions {
    #[must_use]
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Result of searching a pool.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// Nothing to compare against once the source itself is excluded.
    EmptyPool,
    /// Candidates were scored but none reached the minimum score.
    NoneAboveThreshold {
        evaluated: usize,
        best_score: Option<f64>,
    },
    /// Qualifying candidates, best first.
    Ranked(Vec<MatchCandidateResult>),
}

impl MatchOutcome {
    pub fn candidates(&self) -> &[MatchCandidateResult] {
        match self {
            Self::Ranked(candidates) => candidates,
            Self::EmptyPool | Self::NoneAboveThreshold { .. } => &[],
        }
    }

    pub fn into_candidates(self) -> Vec<MatchCandidateResult> {
        match self {
            Self::Ranked(candidates) => candidates,
            Self::EmptyPool | Self::NoneAboveThreshold { .. } => Vec::new(),
        }
    }

    pub fn top(&self) -> Option<&MatchCandidateResult> {
        self.candidates().first()
    }

    pub fn is_empty_pool(&self) -> bool {
        matches!(self, Self::EmptyPool)
    }

    pub fn has_matches(&self) -> bool {
        !self.candidates().is_empty()
    }
}

/// Primary search plus the deterministic fallback, when one was run.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSearch {
    pub primary_algorithm: AlgorithmType,
    pub primary: MatchOutcome,
    /// Present only when the probabilistic search ranked nothing.
    pub fallback: Option<MatchOutcome>,
}

impl FallbackSearch {
    /// The outcome a caller following the fallback policy would show.
    pub fn preferred(&self) -> &MatchOutcome {
        match &self.fallback {
            Some(fallback) if !self.primary.has_matches() => fallback,
            _ => &self.primary,
        }
    }

    pub fn used_fallback(&self) -> bool {
        self.fallback.as_ref().is_some_and(MatchOutcome::has_matches)
    }
}

/// Rank `pool` against `source` with the configured algorithm.
pub fn find_matches(source: &Record, pool: &[Record], config: &MatchingConfig) -> MatchOutcome {
    find_matches_with(source, pool, config, &SearchOptions::default())
}

/// Interactive single-record search.
pub fn find_matches_for_record(
    source: &Record,
    pool: &[Record],
    config: &MatchingConfig,
) -> MatchOutcome {
    find_matches(source, pool, config)
}

pub fn find_matches_with(
    source: &Record,
    pool: &[Record],
    config: &MatchingConfig,
    options: &SearchOptions,
) -> MatchOutcome {
    let scorer = scorer_for(config);
    rank_candidates(scorer.as_ref(), source, pool, config, options)
}

/// Run the configured search; when it is probabilistic and ranks nothing,
/// also run the deterministic scorer and return both.
pub fn find_matches_with_fallback(
    source: &Record,
    pool: &[Record],
    config: &MatchingConfig,
    options: &SearchOptions,
) -> FallbackSearch {
    let primary = find_matches_with(source, pool, config, options);
    let fallback = (config.algorithm_type() == AlgorithmType::Probabilistic
        && !primary.has_matches()
        && !primary.is_empty_pool())
    .then(|| {
        debug!(source_id = %source.id, "probabilistic search ranked nothing; running deterministic");
        rank_candidates(
            &DeterministicScorer::new(config),
            source,
            pool,
            config,
            options,
        )
    });
    FallbackSearch {
        primary_algorithm: config.algorithm_type(),
        primary,
        fallback,
    }
}

/// Score and rank with an explicit scorer.
pub fn rank_candidates(
    scorer: &dyn Scorer,
    source: &Record,
    pool: &[Record],
    config: &MatchingConfig,
    options: &SearchOptions,
) -> MatchOutcome {
    let candidates: Vec<&Record> = pool.iter().filter(|c| c.id != source.id).collect();
    if candidates.is_empty() {
        debug!(source_id = %source.id, "candidate pool empty");
        return MatchOutcome::EmptyPool;
    }

    let thresholds = config.threshold();
    let min_score = options.min_score.unwrap_or(thresholds.low());
    let scored: Vec<MatchCandidateResult> = candidates
        .par_iter()
        .map(|candidate| {
            let pair = scorer.score_pair(source, candidate);
            MatchCandidateResult {
                candidate_record_id: candidate.id.clone(),
                score: pair.score,
                band: classify(pair.score, &thresholds),
                matched_on: pair.matched_on,
                field_scores: pair.field_scores,
            }
        })
        .collect();

    let evaluated = scored.len();
    let best_score = scored.iter().map(|c| c.score).max_by(f64::total_cmp);
    let mut ranked: Vec<MatchCandidateResult> =
        scored.into_iter().filter(|c| c.score >= min_score).collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    if let Some(limit) = options.limit {
        ranked.truncate(limit);
    }

    debug!(
        source_id = %source.id,
        algorithm = ?scorer.algorithm(),
        evaluated,
        ranked = ranked.len(),
        "scored candidate pool"
    );

    if ranked.is_empty() {
        MatchOutcome::NoneAboveThreshold {
            evaluated,
            best_score,
        }
    } else {
        MatchOutcome::Ranked(ranked)
    }
}
