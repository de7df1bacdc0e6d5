//! The filter stage: keyword and date-range narrowing of the result set.
//!
//! Keywords are OR-combined and matched case-insensitively as substrings of
//! every string field of a record. The date range is checked against the
//! column the record's site declares as its date column, read day-first.
//! A record whose date cannot be read is kept.

use crate::models::Record;
use crate::registry::Registry;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, instrument};

static OR_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bOR\b").expect("static regex"));

static YEAR_FIRST_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b").expect("static regex"));

static DAY_NAMED_MONTH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[-/. ]+([A-Za-z]{3,9})\.?[-/., ]+(\d{4}|\d{2})\b").expect("static regex")
});

static NAMED_MONTH_DAY_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z]{3,9})\.?[ -]+(\d{1,2}),?[ -]+(\d{4})\b").expect("static regex")
});

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}|\d{2})\b").expect("static regex")
});

/// Split user keyword text on the standalone word `OR`.
///
/// Parts are trimmed and lowercased; empty parts are dropped.
///
/// ```ignore
/// assert_eq!(parse_keywords("Solar OR Irrigation"), vec!["solar", "irrigation"]);
/// ```
pub fn parse_keywords(input: &str) -> Vec<String> {
    OR_SEPARATOR
        .split(input)
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Read the earliest valid date in `text`, day before month.
///
/// Understands `2024-10-19`, `2024/10/19`, `19-Oct-2024 10:00 AM`, `19-Oct-24`,
/// `19 October 2024`, `Oct 19, 2024`, `19/10/2024` and `19.10.24`. Two-digit
/// years are taken as 20xx. A match that is not a real date (`2024-13-01`,
/// `3 Units 2024`) is skipped and scanning continues.
///
/// # Returns
///
/// `None` when no valid date occurs anywhere in `text`.
pub fn parse_day_first_date(text: &str) -> Option<NaiveDate> {
    let year_first = YEAR_FIRST_DATE
        .captures_iter(text)
        .filter_map(|c| date_at(&c, date_from_parts(&c[1], month_number(&c[2])?, &c[3])));
    let day_named_month = DAY_NAMED_MONTH_DATE
        .captures_iter(text)
        .filter_map(|c| date_at(&c, date_from_parts(&c[3], month_from_name(&c[2])?, &c[1])));
    let named_month_day = NAMED_MONTH_DAY_DATE
        .captures_iter(text)
        .filter_map(|c| date_at(&c, date_from_parts(&c[3], month_from_name(&c[1])?, &c[2])));
    let numeric = NUMERIC_DATE
        .captures_iter(text)
        .filter_map(|c| date_at(&c, date_from_parts(&c[3], month_number(&c[2])?, &c[1])));

    year_first
        .chain(day_named_month)
        .chain(named_month_day)
        .chain(numeric)
        .min_by_key(|(start, _)| *start)
        .map(|(_, date)| date)
}

fn date_at(captures: &Captures, date: Option<NaiveDate>) -> Option<(usize, NaiveDate)> {
    Some((captures.get(0)?.start(), date?))
}

fn date_from_parts(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day.parse().ok()?)
}

fn month_number(digits: &str) -> Option<u32> {
    digits.parse().ok()
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&name))
        .map(|i| i as u32 + 1)
}

/// Keyword and date criteria for one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub keywords: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn new(keyword: Option<&str>, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            keywords: keyword.map(parse_keywords).unwrap_or_default(),
            start_date,
            end_date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.start_date.is_none() && self.end_date.is_none()
    }

    /// True when any keyword occurs in the record, or there are no keywords.
    pub fn matches_keywords(&self, record: &Record) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let haystack = record.searchable_text().to_lowercase();
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }

    /// Date-range check on the cell at 1-based `date_column`.
    ///
    /// Missing or unreadable dates pass.
    pub fn matches_date(&self, record: &Record, date_column: usize) -> bool {
        if self.start_date.is_none() && self.end_date.is_none() {
            return true;
        }
        let Some(date) = record.column(date_column).and_then(parse_day_first_date) else {
            return true;
        };
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        true
    }

    /// Records passing both checks, in input order.
    #[instrument(level = "info", skip_all, fields(keywords = ?self.keywords, start = ?self.start_date, end = ?self.end_date))]
    pub fn apply(&self, records: &[Record], registry: &Registry) -> Vec<Record> {
        if self.is_empty() {
            debug!("No filters set; keeping every record");
            return records.to_vec();
        }
        let kept: Vec<Record> = records
            .iter()
            .filter(|r| self.matches_keywords(r))
            .filter(|r| self.matches_date(r, registry.roles_for(&r.state).date))
            .cloned()
            .collect();
        debug!(before = records.len(), after = kept.len(), "Filtered records");
        kept
    }
}
