//! Record matching engine.
//!
//! - [`compare`]: per-field similarity (exact, Jaro-Winkler, date ladder)
//! - [`deterministic`]: weighted linear scoring
//! - [`probabilistic`]: Fellegi-Sunter log-likelihood scoring
//! - [`classify`]: threshold bands
//! - [`engine`]: ranking a candidate pool for one source record
//! - [`duplicates`]: near-duplicate clusters inside one pool
//!
//! Scoring is pure: no I/O, no shared state, identical inputs give
//! identical rankings.

#![deny(unsafe_code)]

pub mod classify;
pub mod compare;
pub mod deterministic;
pub mod duplicates;
pub mod engine;
pub mod probabilistic;
pub mod scorer;

pub use classify::classify;
pub use compare::{FieldComparison, calculate_advanced_date_similarity, compare_field};
pub use deterministic::{DeterministicScorer, deterministic_score};
pub use duplicates::{DEFAULT_DUPLICATE_THRESHOLD, find_duplicates};
pub use engine::{
    FallbackSearch, MatchOutcome, SearchOptions, find_matches, find_matches_for_record,
    find_matches_with, find_matches_with_fallback, rank_candidates,
};
pub use probabilistic::{ProbabilisticScorer, probabilistic_score};
pub use scorer::{PairScore, ScoreComponent, Scorer, score_pair, scorer_for};
