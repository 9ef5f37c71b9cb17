//! Field value normalization for record comparison.
//!
//! Provides:
//! - **Dates**: multi-format parsing into [`CanonicalDate`]
//! - **Text**: whitespace and case folding, phone digits, sex codes, identifiers
//!
//! All functions are pure and never mutate the record they read from.

pub mod date;
pub mod text;

pub use date::{CanonicalDate, DateComponents, extract_date_components, normalize_date};
pub use text::{normalize_identifier, normalize_phone, normalize_sex, normalize_text};
