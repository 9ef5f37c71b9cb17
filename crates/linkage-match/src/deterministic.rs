//! Weighted linear scoring.
//!
//! `score = 100 * Σ(w·s) / Σ(w)` over the weighted fields present on both
//! records. Fields missing on either side leave both sums untouched, so
//! sparse records are not penalized for data they never had.

use linkage_model::{AlgorithmType, MatchingConfig, Record};

use crate::compare::compare_field;
use crate::scorer::{PairScore, ScoreComponent, Scorer};

/// Per-field similarity at or above which a field counts as matched.
pub const AGREEMENT_CUT: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct DeterministicScorer<'a> {
    config: &'a MatchingConfig,
}

impl<'a> DeterministicScorer<'a> {
    pub fn new(config: &'a MatchingConfig) -> Self {
        Self { config }
    }
}

impl Scorer for DeterministicScorer<'_> {
    fn algorithm(&self) -> AlgorithmType {
        AlgorithmType::Deterministic
    }

    fn score_pair(&self, source: &Record, candidate: &Record) -> PairScore {
        let mut pair = PairScore::empty();
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for (field, weight) in self.config.field_weights().active() {
            let comparison = compare_field(field, source, candidate, self.config.fuzzy_matching());
            let Some(similarity) = comparison.score() else {
                continue;
            };
            numerator += weight * similarity;
            denominator += weight;
            pair.field_scores.insert(field, similarity);
            if similarity >= AGREEMENT_CUT {
                pair.matched_on.insert(field);
            }
            pair.components.push(ScoreComponent {
                field,
                similarity,
                contribution: weight * similarity,
            });
        }

        if denominator > 0.0 {
            pair.score = (100.0 * numerator / denominator).clamp(0.0, 100.0);
        }
        pair
    }
}

/// Deterministic score of one pair, ignoring `config.algorithm_type()`.
pub fn deterministic_score(source: &Record, candidate: &Record, config: &MatchingConfig) -> f64 {
    DeterministicScorer::new(config)
        .score_pair(source, candidate)
        .score
}

#[cfg(test)]
mod tests {
    use linkage_model::{FieldName, FieldWeights};

    use super::*;

    fn config(weights: &[(&str, f64)]) -> MatchingConfig {
        MatchingConfig::default()
            .with_weights(FieldWeights::from_pairs(weights.iter().copied()).unwrap())
            .unwrap()
    }

    #[test]
    fn identical_records_score_full() {
        let record = Record::new("a")
            .with(FieldName::FirstName, "Amanuel")
            .with(FieldName::BirthDate, "1990-03-02");
        let other = Record { id: "b".into(), ..record.clone() };
        let pair = DeterministicScorer::new(&MatchingConfig::default()).score_pair(&record, &other);
        assert_eq!(pair.score, 100.0);
        assert!(pair.matched_on.contains(&FieldName::FirstName));
    }

    #[test]
    fn missing_fields_do_not_shrink_the_score() {
        let config = config(&[("firstName", 1.0), ("village", 1.0)]);
        let a = Record::new("a")
            .with(FieldName::FirstName, "Selam")
            .with(FieldName::Village, "Wukro");
        let b = Record::new("b").with(FieldName::FirstName, "Selam");
        assert_eq!(deterministic_score(&a, &b, &config), 100.0);
    }

    #[test]
    fn weights_are_relative() {
        let a = Record::new("a")
            .with(FieldName::FirstName, "Selam")
            .with(FieldName::Sex, "f");
        let b = Record::new("b")
            .with(FieldName::FirstName, "Selam")
            .with(FieldName::Sex, "m");
        let small = deterministic_score(&a, &b, &config(&[("firstName", 3.0), ("sex", 1.0)]));
        let large = deterministic_score(&a, &b, &config(&[("firstName", 30.0), ("sex", 10.0)]));
        assert!((small - 75.0).abs() < 1e-9);
        assert!((small - large).abs() < 1e-9);
    }

    #[test]
    fn no_shared_fields_scores_zero() {
        let a = Record::new("a").with(FieldName::FirstName, "Selam");
        let b = Record::new("b").with(FieldName::Village, "Wukro");
        let pair = DeterministicScorer::new(&MatchingConfig::default()).score_pair(&a, &b);
        assert_eq!(pair.score, 0.0);
        assert!(pair.field_scores.is_empty());
    }

    #[test]
    fn unparseable_date_counts_as_disagreement() {
        let config = config(&[("firstName", 1.0), ("birthDate", 1.0)]);
        let a = Record::new("a")
            .with(FieldName::FirstName, "Selam")
            .with(FieldName::BirthDate, "1990-03-02");
        let b = Record::new("b")
            .with(FieldName::FirstName, "Selam")
            .with(FieldName::BirthDate, "??");
        assert_eq!(deterministic_score(&a, &b, &config), 50.0);
    }

    #[test]
    fn explanation_lists_fields() {
        let a = Record::new("a").with(FieldName::LastName, "Tesfaye");
        let b = Record::new("b").with(FieldName::LastName, "Tesfaye");
        let pair = DeterministicScorer::new(&MatchingConfig::default()).score_pair(&a, &b);
        assert!(pair.explain().starts_with("lastName: 100%"));
    }
}
