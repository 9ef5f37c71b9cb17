//! Threshold classification of scores.

use linkage_model::{ConfidenceBand, Thresholds};

/// Map a score onto a confidence band.
///
/// Scores are clamped to 0-100 first, so out-of-range input from callers is
/// still classified; NaN classifies as [`ConfidenceBand::None`].
pub fn classify(score: f64, thresholds: &Thresholds) -> ConfidenceBand {
    if score.is_nan() {
        return ConfidenceBand::None;
    }
    let score = score.clamp(0.0, 100.0);
    if score >= thresholds.high() {
        ConfidenceBand::High
    } else if score >= thresholds.medium() {
        ConfidenceBand::Medium
    } else if score >= thresholds.low() {
        ConfidenceBand::Low
    } else {
        ConfidenceBand::None
    }
}
