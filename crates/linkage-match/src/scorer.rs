//! Scorer seam shared by the deterministic and probabilistic models.

use std::collections::BTreeSet;

use linkage_model::{AlgorithmType, FieldName, FieldScores, MatchingConfig, Record};

use crate::deterministic::DeterministicScorer;
use crate::probabilistic::ProbabilisticScorer;

/// A field contributing to a pair score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreComponent {
    pub field: FieldName,
    /// Similarity in [0, 1].
    pub similarity: f64,
    /// Weighted share for the deterministic model, log2 weight for the
    /// probabilistic model (negative on disagreement).
    pub contribution: f64,
}

/// Score for one source/candidate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairScore {
    /// Final score on the 0-100 scale.
    pub score: f64,
    pub matched_on: BTreeSet<FieldName>,
    pub field_scores: FieldScores,
    /// Breakdown of score components for explainability.
    pub components: Vec<ScoreComponent>,
}

impl PairScore {
    pub(crate) fn empty() -> Self {
        Self {
            score: 0.0,
            matched_on: BTreeSet::new(),
            field_scores: FieldScores::new(),
            components: Vec::new(),
        }
    }

    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        self.components
            .iter()
            .map(|c| {
                format!(
                    "{}: {:.0}% ({:+.2})",
                    c.field,
                    c.similarity * 100.0,
                    c.contribution
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Scores a single record pair. Implementations must be pure and symmetric.
pub trait Scorer: Sync {
    fn algorithm(&self) -> AlgorithmType;

    fn score_pair(&self, source: &Record, candidate: &Record) -> PairScore;
}

/// The scorer selected by `config.algorithm_type()`.
pub fn scorer_for(config: &MatchingConfig) -> Box<dyn Scorer + '_> {
    match config.algorithm_type() {
        AlgorithmType::Deterministic => Box::new(DeterministicScorer::new(config)),
        AlgorithmType::Probabilistic => Box::new(ProbabilisticScorer::new(config)),
    }
}

/// Score one pair with the configured algorithm.
pub fn score_pair(source: &Record, candidate: &Record, config: &MatchingConfig) -> PairScore {
    scorer_for(config).score_pair(source, candidate)
}
