//! Data model for the record linkage engine.
//!
//! - [`Record`]: the canonical demographic record compared by the engine
//! - [`FieldName`] / [`FieldWeights`]: scoreable fields and their weights
//! - [`MatchingConfig`]: validated scorer configuration
//! - [`MatchCandidateResult`] / [`MatchResult`]: scoring output and decisions
//! - [`DuplicateGroup`]: clusters found inside a single pool

pub mod config;
pub mod duplicate;
pub mod error;
pub mod field;
pub mod record;
pub mod result;

pub use config::{
    AlgorithmType, FieldProbabilities, FieldWeights, MatchingConfig, ProbabilisticSettings,
    Thresholds,
};
pub use duplicate::{DuplicateGroup, Resolution};
pub use error::{ConfigError, Result};
pub use field::{EXCLUDED_FIELD_KEYS, FieldKind, FieldName};
pub use record::{CommunityLeader, ExternalIdentifier, Record, RecordMetadata};
pub use result::{ConfidenceBand, FieldScores, MatchCandidateResult, MatchResult, MatchStatus};
