//! Fellegi-Sunter scoring.
//!
//! Each compared field adds `log2(m/u)` when it agrees and
//! `log2((1-m)/(1-u))` when it does not. Fuzzy and date fields that agree
//! only partially earn agreement weight scaled by their similarity. The
//! accumulated log2 odds, plus the configured prior, pass through a base-2
//! logistic so the confidence saturates towards 100 instead of diverging.
//!
//! Fields missing on either side are left out of the sum.

use linkage_model::{AlgorithmType, FieldKind, MatchingConfig, Record};

use crate::compare::compare_field;
use crate::scorer::{PairScore, ScoreComponent, Scorer};

/// Similarity a field must reach to count as agreeing.
pub fn agreement_cut(kind: FieldKind) -> f64 {
    match kind {
        FieldKind::Exact => 1.0,
        FieldKind::Fuzzy => 0.85,
        FieldKind::Date => 0.8,
    }
}

/// Map accumulated log2 odds onto 0-100.
pub fn log2_odds_to_confidence(log2_odds: f64) -> f64 {
    (100.0 / (1.0 + (-log2_odds).exp2())).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy)]
pub struct ProbabilisticScorer<'a> {
    config: &'a MatchingConfig,
}

impl<'a> ProbabilisticScorer<'a> {
    pub fn new(config: &'a MatchingConfig) -> Self {
        Self { config }
    }

    /// Score a pair and also return the raw log2 total before the prior.
    pub fn score_with_total(&self, source: &Record, candidate: &Record) -> (PairScore, f64) {
        let settings = self.config.probabilistic();
        let mut pair = PairScore::empty();
        let mut total = 0.0;

        for (field, _) in self.config.field_weights().active() {
            let comparison = compare_field(field, source, candidate, self.config.fuzzy_matching());
            let Some(similarity) = comparison.score() else {
                continue;
            };
            let probabilities = settings.probabilities_for(field);
            let kind = field.kind();
            let contribution = if similarity >= agreement_cut(kind) {
                let agreement = (probabilities.m / probabilities.u).log2();
                match kind {
                    FieldKind::Exact => agreement,
                    FieldKind::Fuzzy | FieldKind::Date => agreement * similarity,
                }
            } else {
                ((1.0 - probabilities.m) / (1.0 - probabilities.u)).log2()
            };

            total += contribution;
            pair.field_scores.insert(field, similarity);
            if contribution > 0.0 {
                pair.matched_on.insert(field);
            }
            pair.components.push(ScoreComponent {
                field,
                similarity,
                contribution,
            });
        }

        if !pair.components.is_empty() {
            pair.score = log2_odds_to_confidence(total + settings.prior_log2_odds);
        }
        (pair, total)
    }
}

impl Scorer for ProbabilisticScorer<'_> {
    fn algorithm(&self) -> AlgorithmType {
        AlgorithmType::Probabilistic
    }

    fn score_pair(&self, source: &Record, candidate: &Record) -> PairScore {
        self.score_with_total(source, candidate).0
    }
}

/// Probabilistic score of one pair, ignoring `config.algorithm_type()`.
pub fn probabilistic_score(source: &Record, candidate: &Record, config: &MatchingConfig) -> f64 {
    ProbabilisticScorer::new(config)
        .score_pair(source, candidate)
        .score
}
