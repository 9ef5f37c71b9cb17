//! Tests for date normalization.

use linkage_normalization::{extract_date_components, normalize_date, normalize_text};
use proptest::prelude::*;

// =========================================================================
// Format coverage
// =========================================================================

#[test]
fn same_day_in_every_layout() {
    let layouts = [
        "1990-03-02",
        "02.03.1990",
        "02/03/1990",
        "02-03-1990",
        "1990/03/02",
        "19900302",
        "2 March 1990",
        "March 2, 1990",
    ];
    let expected = normalize_date("1990-03-02").unwrap();
    for raw in layouts {
        assert_eq!(normalize_date(raw), Some(expected), "layout {raw}");
    }
}

#[test]
fn month_first_only_when_day_first_is_impossible() {
    let date = normalize_date("04/13/2001").unwrap();
    assert_eq!((date.year(), date.month(), date.day()), (2001, 4, 13));
}

#[test]
fn garbage_yields_empty_components() {
    for raw in ["", "??", "1990-02-30", "32/01/1990", "abc 12"] {
        let parts = extract_date_components(raw);
        assert!(parts.year.is_none() && parts.month.is_none() && parts.day.is_none());
    }
}

// =========================================================================
// Properties
// =========================================================================

proptest! {
    #[test]
    fn never_panics_on_arbitrary_input(raw in ".{0,40}") {
        let _ = normalize_date(&raw);
        let _ = normalize_text(&raw);
    }

    #[test]
    fn iso_round_trips(year in 1900i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let raw = format!("{year:04}-{month:02}-{day:02}");
        let date = normalize_date(&raw).unwrap();
        prop_assert_eq!(date.to_string(), raw);
    }
}
