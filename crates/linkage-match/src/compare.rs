//! Per-field similarity between two records.
//!
//! Uses Jaro-Winkler similarity for fuzzy text fields, normalized equality
//! for exact fields and an ordinal ladder for dates. Inputs are ordered
//! before fuzzy comparison so `compare(a, b) == compare(b, a)` holds
//! bit-for-bit.

use linkage_model::{FieldKind, FieldName, Record};
use linkage_normalization::{
    normalize_date, normalize_identifier, normalize_phone, normalize_sex, normalize_text,
};
use rapidfuzz::distance::jaro_winkler;

/// Outcome of comparing one field across two records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldComparison {
    /// Blank or absent on at least one side: no signal either way.
    Missing,
    /// Present on both sides but could not be interpreted (e.g. a bad date).
    Unparseable,
    /// Similarity in [0, 1].
    Similarity(f64),
}

impl FieldComparison {
    /// Similarity to score with, `None` when the field must be left out.
    pub fn score(self) -> Option<f64> {
        match self {
            Self::Missing => None,
            Self::Unparseable => Some(0.0),
            Self::Similarity(value) => Some(value),
        }
    }
}

/// Compare `field` on two records.
pub fn compare_field(
    field: FieldName,
    source: &Record,
    candidate: &Record,
    fuzzy_matching: bool,
) -> FieldComparison {
    if field == FieldName::Identifiers {
        return compare_identifiers(source, candidate);
    }
    let (Some(left), Some(right)) = (source.text(field), candidate.text(field)) else {
        return FieldComparison::Missing;
    };
    match field.kind() {
        FieldKind::Date => compare_dates(left, right),
        FieldKind::Exact => {
            let normalize: fn(&str) -> Option<String> = match field {
                FieldName::PhoneNumber => normalize_phone,
                FieldName::Sex => normalize_sex,
                _ => normalize_text,
            };
            match (normalize(left), normalize(right)) {
                (Some(a), Some(b)) => FieldComparison::Similarity(if a == b { 1.0 } else { 0.0 }),
                _ => FieldComparison::Missing,
            }
        }
        FieldKind::Fuzzy => match (normalize_text(left), normalize_text(right)) {
            (Some(a), Some(b)) if fuzzy_matching => FieldComparison::Similarity(fuzzy_similarity(&a, &b)),
            (Some(a), Some(b)) => FieldComparison::Similarity(if a == b { 1.0 } else { 0.0 }),
            _ => FieldComparison::Missing,
        },
    }
}

/// Jaro-Winkler similarity of two already-normalized strings.
pub fn fuzzy_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    jaro_winkler::similarity(first.chars(), second.chars()).clamp(0.0, 1.0)
}

/// Ordinal date agreement on the 0-100 scale.
///
/// - 100: same date
/// - 80: same year and month
/// - 50: same year
/// - 30: years at most two apart
/// - 0: otherwise, or when either side does not parse
pub fn calculate_advanced_date_similarity(a: &str, b: &str) -> u8 {
    let (Some(left), Some(right)) = (normalize_date(a), normalize_date(b)) else {
        return 0;
    };
    if left == right {
        100
    } else if left.year() == right.year() && left.month() == right.month() {
        80
    } else if left.year() == right.year() {
        50
    } else if (left.year() - right.year()).abs() <= 2 {
        30
    } else {
        0
    }
}

fn compare_dates(left: &str, right: &str) -> FieldComparison {
    if left.trim().is_empty() || right.trim().is_empty() {
        return FieldComparison::Missing;
    }
    if normalize_date(left).is_none() || normalize_date(right).is_none() {
        return FieldComparison::Unparseable;
    }
    FieldComparison::Similarity(f64::from(calculate_advanced_date_similarity(left, right)) / 100.0)
}

fn compare_identifiers(source: &Record, candidate: &Record) -> FieldComparison {
    let left = identifier_keys(source);
    let right = identifier_keys(candidate);
    if left.is_empty() || right.is_empty() {
        return FieldComparison::Missing;
    }
    let shared = left.iter().any(|key| right.contains(key));
    FieldComparison::Similarity(if shared { 1.0 } else { 0.0 })
}

fn identifier_keys(record: &Record) -> Vec<(String, String)> {
    record
        .identifiers
        .iter()
        .filter_map(|id| {
            let value = normalize_identifier(&id.value)?;
            let id_type = normalize_identifier(&id.id_type).unwrap_or_default();
            Some((id_type, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str) -> Record {
        Record::new(id)
    }

    #[test]
    fn date_ladder() {
        assert_eq!(calculate_advanced_date_similarity("2000-05-17", "2000-05-17"), 100);
        assert_eq!(calculate_advanced_date_similarity("2000-05-17", "2000-05-01"), 80);
        assert_eq!(calculate_advanced_date_similarity("2000-05-17", "2000-11-02"), 50);
        assert_eq!(calculate_advanced_date_similarity("2000-05-17", "2002-05-17"), 30);
        assert_eq!(calculate_advanced_date_similarity("2000-05-17", "2010-05-17"), 0);
        assert_eq!(calculate_advanced_date_similarity("2000-05-17", "garbage"), 0);
    }

    #[test]
    fn date_ladder_across_formats() {
        assert_eq!(calculate_advanced_date_similarity("17.05.2000", "2000-05-17"), 100);
    }

    #[test]
    fn unparseable_date_is_distinct_from_missing() {
        let a = person("a").with(FieldName::BirthDate, "1990-03-02");
        let b = person("b").with(FieldName::BirthDate, "sometime in spring");
        let c = person("c");
        assert_eq!(
            compare_field(FieldName::BirthDate, &a, &b, true),
            FieldComparison::Unparseable
        );
        assert_eq!(
            compare_field(FieldName::BirthDate, &a, &c, true),
            FieldComparison::Missing
        );
        assert_eq!(FieldComparison::Unparseable.score(), Some(0.0));
    }

    #[test]
    fn empty_versus_empty_is_missing() {
        let a = person("a").with(FieldName::FirstName, "  ");
        let b = person("b").with(FieldName::FirstName, "");
        assert_eq!(
            compare_field(FieldName::FirstName, &a, &b, true),
            FieldComparison::Missing
        );
    }

    #[test]
    fn fuzzy_names_score_partially() {
        let a = person("a").with(FieldName::FirstName, "Amanuel");
        let b = person("b").with(FieldName::FirstName, "Amanual");
        let FieldComparison::Similarity(score) = compare_field(FieldName::FirstName, &a, &b, true)
        else {
            panic!("expected a similarity");
        };
        assert!(score > 0.85 && score < 1.0, "got {score}");
        assert_eq!(
            compare_field(FieldName::FirstName, &a, &b, false),
            FieldComparison::Similarity(0.0)
        );
    }

    #[test]
    fn case_and_spacing_do_not_matter() {
        let a = person("a").with(FieldName::Village, " Adi  Ha");
        let b = person("b").with(FieldName::Village, "adi ha");
        assert_eq!(
            compare_field(FieldName::Village, &a, &b, false),
            FieldComparison::Similarity(1.0)
        );
    }

    #[test]
    fn exact_fields_normalize_first() {
        let a = person("a")
            .with(FieldName::PhoneNumber, "+251 911 234567")
            .with(FieldName::Sex, "Female");
        let b = person("b")
            .with(FieldName::PhoneNumber, "251-911-234-567")
            .with(FieldName::Sex, "F");
        assert_eq!(
            compare_field(FieldName::PhoneNumber, &a, &b, true),
            FieldComparison::Similarity(1.0)
        );
        assert_eq!(
            compare_field(FieldName::Sex, &a, &b, true),
            FieldComparison::Similarity(1.0)
        );
    }

    #[test]
    fn identifiers_match_on_any_shared_pair() {
        let a = person("a").with_identifier("NID", "ab-12").with_identifier("clinic", "7");
        let b = person("b").with_identifier("nid", "AB-12");
        let c = person("c").with_identifier("clinic", "8");
        assert_eq!(
            compare_field(FieldName::Identifiers, &a, &b, true),
            FieldComparison::Similarity(1.0)
        );
        assert_eq!(
            compare_field(FieldName::Identifiers, &a, &c, true),
            FieldComparison::Similarity(0.0)
        );
        assert_eq!(
            compare_field(FieldName::Identifiers, &b, &person("d"), true),
            FieldComparison::Missing
        );
    }

    #[test]
    fn fuzzy_similarity_is_symmetric() {
        for (a, b) in [("martha", "marhta"), ("dixon", "dicksonx"), ("abc", "xyz")] {
            assert_eq!(fuzzy_similarity(a, b), fuzzy_similarity(b, a));
        }
    }
}
