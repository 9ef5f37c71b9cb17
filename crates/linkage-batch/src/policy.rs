//! Auto-match strategies.
//!
//! A strategy looks only at the ranked candidates of one record. Cross-record
//! concerns such as targets claimed twice are handled by the engine.

use linkage_model::MatchCandidateResult;

use crate::config::{AutoMatchStrategy, BatchMatchConfig};
use crate::job::MatchDecision;

/// Policy outcome for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub decision: MatchDecision,
    /// Indices into the candidate list of the accepted targets.
    pub accepted: Vec<usize>,
}

impl Verdict {
    fn accept(indices: Vec<usize>) -> Self {
        Self {
            decision: MatchDecision::AutoMatched,
            accepted: indices,
        }
    }

    fn hold(decision: MatchDecision) -> Self {
        Self {
            decision,
            accepted: Vec::new(),
        }
    }
}

/// Review when the top score reaches the review cut, otherwise no match.
pub fn review_or_reject(top_score: Option<f64>, config: &BatchMatchConfig) -> MatchDecision {
    match top_score {
        Some(score) if score >= config.manual_review_threshold => MatchDecision::ManualReview,
        _ => MatchDecision::NoMatch,
    }
}

/// Apply the configured strategy to candidates ranked best first.
pub fn decide(candidates: &[MatchCandidateResult], config: &BatchMatchConfig) -> Verdict {
    let Some(top) = candidates.first() else {
        return Verdict::hold(MatchDecision::NoMatch);
    };
    let auto = config.auto_match_threshold;
    let above_auto = candidates.iter().take_while(|c| c.score >= auto).count();
    let fallback = || Verdict::hold(review_or_reject(Some(top.score), config));

    match config.auto_match_strategy {
        AutoMatchStrategy::HighConfidenceOnly => {
            if above_auto == 1 {
                Verdict::accept(vec![0])
            } else {
                fallback()
            }
        }
        AutoMatchStrategy::ThresholdBased => {
            if above_auto == 0 {
                fallback()
            } else if config.allow_multiple_matches {
                Verdict::accept((0..above_auto).collect())
            } else {
                Verdict::accept(vec![0])
            }
        }
        AutoMatchStrategy::ManualReviewAll => Verdict::hold(MatchDecision::ManualReview),
        AutoMatchStrategy::BestMatchOnly => {
            let lead = candidates
                .get(1)
                .map_or(f64::INFINITY, |second| top.score - second.score);
            if top.score >= auto && lead >= config.best_match_margin {
                Verdict::accept(vec![0])
            } else {
                fallback()
            }
        }
    }
}
