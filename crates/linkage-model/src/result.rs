//! Scoring outputs and human/batch decision records.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::field::FieldName;

/// Classification of a score against configured thresholds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ConfidenceBand {
    None,
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        }
    }

    /// Returns a human-readable description of the band.
    pub fn description(self) -> &'static str {
        match self {
            Self::High => "high confidence - likely the same person",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
            Self::None => "below the lowest threshold",
        }
    }
}

impl std::fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field similarity in [0, 1] for fields present on both records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldScores(BTreeMap<FieldName, f64>);

impl FieldScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a similarity, clamped to [0, 1].
    pub fn insert(&mut self, field: FieldName, similarity: f64) {
        let value = if similarity.is_nan() {
            0.0
        } else {
            similarity.clamp(0.0, 1.0)
        };
        self.0.insert(field, value);
    }

    pub fn get(&self, field: FieldName) -> Option<f64> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, f64)> + '_ {
        self.0.iter().map(|(field, score)| (*field, *score))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Similarities on the 0-100 scale.
    pub fn as_percentages(&self) -> BTreeMap<FieldName, f64> {
        self.0
            .iter()
            .map(|(field, score)| (*field, score * 100.0))
            .collect()
    }
}

/// One scored candidate for a source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidateResult {
    pub candidate_record_id: String,
    /// Overall score on the 0-100 scale.
    pub score: f64,
    pub band: ConfidenceBand,
    pub matched_on: BTreeSet<FieldName>,
    pub field_scores: FieldScores,
}

/// Outcome of a match decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    Matched,
    Rejected,
    ManualReview,
}

/// A decision about a source record, made by a reviewer or by batch
/// auto-accept. Never edited: corrections are new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub source_id: String,
    pub match_id: Option<String>,
    pub status: MatchStatus,
    pub confidence: f64,
    pub field_scores: FieldScores,
    pub consent_obtained: bool,
    pub consent_date: Option<NaiveDate>,
    pub notes: String,
    pub matched_by: String,
    pub matched_at: DateTime<Utc>,
}

impl MatchResult {
    /// Accept `candidate` as the match for `source_id`.
    pub fn matched(
        source_id: impl Into<String>,
        candidate: &MatchCandidateResult,
        matched_by: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            match_id: Some(candidate.candidate_record_id.clone()),
            status: MatchStatus::Matched,
            confidence: candidate.score,
            field_scores: candidate.field_scores.clone(),
            consent_obtained: false,
            consent_date: None,
            notes: String::new(),
            matched_by: matched_by.into(),
            matched_at: Utc::now(),
        }
    }

    /// Queue `candidate` for a reviewer.
    pub fn manual_review(
        source_id: impl Into<String>,
        candidate: &MatchCandidateResult,
        matched_by: impl Into<String>,
    ) -> Self {
        Self {
            status: MatchStatus::ManualReview,
            ..Self::matched(source_id, candidate, matched_by)
        }
    }

    /// Record that no candidate is the same person.
    pub fn rejected(source_id: impl Into<String>, matched_by: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            match_id: None,
            status: MatchStatus::Rejected,
            confidence: 0.0,
            field_scores: FieldScores::default(),
            consent_obtained: false,
            consent_date: None,
            notes: String::new(),
            matched_by: matched_by.into(),
            matched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_consent(mut self, date: NaiveDate) -> Self {
        self.consent_obtained = true;
        self.consent_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// A correction of this decision, stamped now. `self` is left untouched.
    pub fn supersede(&self, status: MatchStatus, matched_by: impl Into<String>) -> Self {
        Self {
            status,
            match_id: match status {
                MatchStatus::Rejected => None,
                MatchStatus::Matched | MatchStatus::ManualReview => self.match_id.clone(),
            },
            matched_by: matched_by.into(),
            matched_at: Utc::now(),
            ..self.clone()
        }
    }
}
