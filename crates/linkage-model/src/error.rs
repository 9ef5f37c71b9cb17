//! Configuration validation errors.

use thiserror::Error;

/// Errors raised while building or loading a matching configuration.
///
/// These are always reported before any scoring starts.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A weight key names an administrative field that is never scored.
    #[error("field '{0}' is administrative and cannot be weighted")]
    ExcludedField(String),

    /// A weight key does not name a known field.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A weight is negative, NaN or infinite.
    #[error("invalid weight {weight} for field '{field}': weights must be finite and non-negative")]
    InvalidWeight { field: String, weight: f64 },

    /// No field carries a positive weight.
    #[error("field weights must contain at least one positive weight")]
    NoWeightedFields,

    /// A threshold is outside 0..=100 or not finite.
    #[error("threshold '{name}' must be within 0..=100, got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    /// Thresholds are not ascending.
    #[error("threshold ordering violated: {upper} ({upper_value}) < {lower} ({lower_value})")]
    ThresholdOrder {
        upper: &'static str,
        upper_value: f64,
        lower: &'static str,
        lower_value: f64,
    },

    /// An m or u probability is outside the open interval (0, 1).
    #[error("{parameter}-probability for field '{field}' must be within (0, 1), got {value}")]
    InvalidProbability {
        field: String,
        parameter: &'static str,
        value: f64,
    },

    /// A probabilistic prior is not finite.
    #[error("prior log2 odds must be finite, got {0}")]
    InvalidPrior(f64),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
