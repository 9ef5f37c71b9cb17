//! Multi-format birth date parsing.
//!
//! Registry and clinic data carry dates typed by hand in several layouts.
//! Parsing tries, in order:
//!
//! 1. ISO 8601 `YYYY-MM-DD` (a trailing time part is ignored)
//! 2. Day-first `DD.MM.YYYY`, `DD/MM/YYYY`, `DD-MM-YYYY`
//! 3. Month-first `MM/DD/YYYY`
//! 4. A permissive list of other layouts
//!
//! Parsing never fails loudly: anything unrecognized yields `None`.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Layouts tried after the structured passes.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// A successfully parsed calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CanonicalDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Year, month and day of a parsed date; all `None` when parsing failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateComponents {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

/// Parse a free-form date into its canonical form.
pub fn normalize_date(raw: &str) -> Option<CanonicalDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_iso(trimmed)
        .or_else(|| parse_day_first(trimmed))
        .or_else(|| parse_month_first(trimmed))
        .or_else(|| parse_fallback(trimmed))
        .map(CanonicalDate)
}

/// Components of [`normalize_date`].
pub fn extract_date_components(raw: &str) -> DateComponents {
    match normalize_date(raw) {
        Some(date) => DateComponents {
            year: Some(date.year()),
            month: Some(date.month()),
            day: Some(date.day()),
        },
        None => DateComponents::default(),
    }
}

fn parse_iso(value: &str) -> Option<NaiveDate> {
    let date_part = value.split(['T', ' ']).next()?;
    let parts = split_numeric(date_part, '-')?;
    let [year, month, day] = parts;
    if year.len() != 4 {
        return None;
    }
    ymd(year, month, day)
}

fn parse_day_first(value: &str) -> Option<NaiveDate> {
    ['.', '/', '-'].into_iter().find_map(|sep| {
        let [day, month, year] = split_numeric(value, sep)?;
        if year.len() != 4 || day.len() > 2 || month.len() > 2 {
            return None;
        }
        let (day_n, month_n) = (day.parse::<u32>().ok()?, month.parse::<u32>().ok()?);
        if day_n > 31 || month_n > 12 {
            return None;
        }
        ymd(year, month, day)
    })
}

fn parse_month_first(value: &str) -> Option<NaiveDate> {
    let [month, day, year] = split_numeric(value, '/')?;
    if year.len() != 4 || day.len() > 2 || month.len() > 2 {
        return None;
    }
    ymd(year, month, day)
}

fn parse_fallback(value: &str) -> Option<NaiveDate> {
    FALLBACK_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Split into exactly three non-empty all-digit parts.
fn split_numeric(value: &str, sep: char) -> Option<[&str; 3]> {
    let mut parts = value.split(sep);
    let out = [parts.next()?, parts.next()?, parts.next()?];
    if parts.next().is_some() {
        return None;
    }
    if out
        .iter()
        .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    Some(out)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}
