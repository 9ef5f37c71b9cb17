//! Batch policy configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};

/// When a candidate may be accepted without a reviewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoMatchStrategy {
    /// Accept only a top candidate that is the sole one above the auto cut.
    #[default]
    HighConfidenceOnly,
    /// Accept whatever clears the auto cut.
    ThresholdBased,
    /// Never accept; queue every record with a candidate.
    ManualReviewAll,
    /// Accept only when the top candidate clearly leads the runner-up.
    BestMatchOnly,
}

impl AutoMatchStrategy {
    pub const ALL: [Self; 4] = [
        Self::HighConfidenceOnly,
        Self::ThresholdBased,
        Self::ManualReviewAll,
        Self::BestMatchOnly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighConfidenceOnly => "high-confidence-only",
            Self::ThresholdBased => "threshold-based",
            Self::ManualReviewAll => "manual-review-all",
            Self::BestMatchOnly => "best-match-only",
        }
    }
}

impl std::fmt::Display for AutoMatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a target was already auto-accepted for an earlier
/// source record in the same job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateHandling {
    /// Withdraw the repeat acceptance.
    #[default]
    Skip,
    /// Accept, linking the result to the earlier source record.
    Merge,
    /// Accept without further bookkeeping.
    KeepAll,
}

/// Policy settings for one batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchMatchConfig {
    pub auto_match_strategy: AutoMatchStrategy,
    /// Score at or above which a candidate may be auto-accepted.
    pub auto_match_threshold: f64,
    /// Score at or above which a record is queued for review.
    pub manual_review_threshold: f64,
    /// Candidates kept per source record, and the most a record may accept.
    /// Strategies always judge the full ranked list.
    pub max_matches_per_record: usize,
    /// Source records per chunk.
    pub batch_size: usize,
    pub handle_duplicates: DuplicateHandling,
    /// Accept every candidate above the auto cut, not only the top one.
    pub allow_multiple_matches: bool,
    /// Lead over the runner-up required by `best-match-only`.
    pub best_match_margin: f64,
}

impl Default for BatchMatchConfig {
    fn default() -> Self {
        Self {
            auto_match_strategy: AutoMatchStrategy::default(),
            auto_match_threshold: 90.0,
            manual_review_threshold: 60.0,
            max_matches_per_record: 5,
            batch_size: 100,
            handle_duplicates: DuplicateHandling::default(),
            allow_multiple_matches: false,
            best_match_margin: 10.0,
        }
    }
}

impl BatchMatchConfig {
    #[must_use]
    pub fn with_strategy(mut self, strategy: AutoMatchStrategy) -> Self {
        self.auto_match_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_max_matches(mut self, max_matches_per_record: usize) -> Self {
        self.max_matches_per_record = max_matches_per_record;
        self
    }

    #[must_use]
    pub fn with_thresholds(mut self, auto_match: f64, manual_review: f64) -> Self {
        self.auto_match_threshold = auto_match;
        self.manual_review_threshold = manual_review;
        self
    }

    #[must_use]
    pub fn with_duplicate_handling(mut self, handling: DuplicateHandling) -> Self {
        self.handle_duplicates = handling;
        self
    }

    #[must_use]
    pub fn with_multiple_matches(mut self, allow: bool) -> Self {
        self.allow_multiple_matches = allow;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(invalid("batchSize", "must be at least 1"));
        }
        if self.max_matches_per_record == 0 {
            return Err(invalid("maxMatchesPerRecord", "must be at least 1"));
        }
        for (name, value) in [
            ("autoMatchThreshold", self.auto_match_threshold),
            ("manualReviewThreshold", self.manual_review_threshold),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(invalid(name, format!("{value} is outside 0-100")));
            }
        }
        if self.manual_review_threshold > self.auto_match_threshold {
            return Err(invalid(
                "manualReviewThreshold",
                format!(
                    "{} exceeds autoMatchThreshold {}",
                    self.manual_review_threshold, self.auto_match_threshold
                ),
            ));
        }
        if !self.best_match_margin.is_finite() || self.best_match_margin < 0.0 {
            return Err(invalid("bestMatchMargin", "must be a non-negative number"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> BatchError {
    BatchError::InvalidSetting {
        name,
        reason: reason.into(),
    }
}
