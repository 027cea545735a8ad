//! Relative and natural date resolution.
//!
//! `resolve` runs an ordered rule table against a normalized phrase and a
//! reference instant (local wall-clock time in the user's zone). The first
//! rule that yields a valid calendar date wins; rules that would produce an
//! impossible date (June 31st) simply don't match.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{EntityKind, NlpError, NlpResult};

/// Weekday names, indexed from Monday = 0.
pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Regex alternation of weekday names.
pub const WEEKDAY_PATTERN: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";

/// Regex alternation of month names; full names precede their abbreviations
/// because alternation is leftmost-first.
pub const MONTH_PATTERN: &str = "january|february|march|april|may|june|july|august|september|october|november|december|sept|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec";

static RE_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?\b").unwrap());

static RE_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b({MONTH_PATTERN})\b")).unwrap());

static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").unwrap());

static RE_ISO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// A single resolution rule.
pub type DateRule = fn(&str, NaiveDateTime) -> Option<NaiveDate>;

/// Resolution rules in priority order.
pub const RULES: &[(&str, DateRule)] = &[
    ("keyword", keyword),
    ("weekday", weekday),
    ("iso", iso),
    ("day_of_month", day_of_month),
];

/// Resolve a date phrase against `reference`.
pub fn resolve(phrase: &str, reference: NaiveDateTime) -> NlpResult<NaiveDate> {
    let normalized = normalize(phrase);
    RULES
        .iter()
        .find_map(|(name, rule)| {
            let date = rule(&normalized, reference)?;
            tracing::trace!(rule = *name, phrase = %normalized, %date, "date resolved");
            Some(date)
        })
        .ok_or_else(|| NlpError::unresolvable(EntityKind::Date, phrase.trim()))
}

/// Lowercase, collapse whitespace, strip surrounding punctuation.
fn normalize(phrase: &str) -> String {
    phrase
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| matches!(c, '?' | '!' | '.' | ','))
        .to_string()
}

/// `today`, `tomorrow`, `day after tomorrow` / `day after`, `yesterday`.
pub fn keyword(phrase: &str, reference: NaiveDateTime) -> Option<NaiveDate> {
    let offset = match phrase {
        "today" => 0,
        "tomorrow" => 1,
        "day after tomorrow" | "day after" => 2,
        "yesterday" => -1,
        _ => return None,
    };
    reference.date().checked_add_signed(Duration::days(offset))
}

/// Weekday names, optionally qualified by `next week` / `coming week` /
/// `this week` / `next`.
///
/// `next week <day>` always lands in the following Monday-based week. Every
/// other form resolves to the nearest occurrence strictly after today, so
/// naming today's weekday means a week from today.
pub fn weekday(phrase: &str, reference: NaiveDateTime) -> Option<NaiveDate> {
    let target = WEEKDAYS.iter().position(|day| phrase.contains(day))? as i64;
    let current = i64::from(reference.weekday().num_days_from_monday());

    let days_ahead = if phrase.contains("next week") || phrase.contains("coming week") {
        7 - current + target
    } else {
        let offset = target - current;
        if offset <= 0 { offset + 7 } else { offset }
    };

    reference.date().checked_add_signed(Duration::days(days_ahead))
}

/// Literal `YYYY-MM-DD`, returned as-is when it names a real date.
pub fn iso(phrase: &str, _reference: NaiveDateTime) -> Option<NaiveDate> {
    if !RE_ISO.is_match(phrase) {
        return None;
    }
    NaiveDate::parse_from_str(phrase, "%Y-%m-%d").ok()
}

/// Day of month with optional ordinal suffix, month name and year.
///
/// Without a month the current month is assumed and rolled forward one
/// month when the day has already passed: for `coming`/`next` phrases when
/// the day's midnight is at or before the reference, otherwise only when it
/// is strictly before. A `20xx` year applies only alongside a month name.
pub fn day_of_month(phrase: &str, reference: NaiveDateTime) -> Option<NaiveDate> {
    // A malformed ISO date must not be reinterpreted digit by digit.
    if RE_ISO.is_match(phrase) {
        return None;
    }

    let day: u32 = RE_DAY.captures(phrase)?[1].parse().ok()?;

    if let Some(month) = RE_MONTH.captures(phrase).and_then(|c| month_number(&c[1])) {
        let year = RE_YEAR
            .captures(phrase)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or(reference.year());
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let upcoming_only = phrase.contains("coming") || phrase.contains("next");
    let this_month = NaiveDate::from_ymd_opt(reference.year(), reference.month(), day);
    let passed = match this_month {
        Some(date) => {
            let midnight = date.and_time(NaiveTime::MIN);
            if upcoming_only {
                midnight <= reference
            } else {
                midnight < reference
            }
        }
        None => true,
    };

    if !passed {
        return this_month;
    }

    let (year, month) = if reference.month() == 12 {
        (reference.year() + 1, 1)
    } else {
        (reference.year(), reference.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Map a full or abbreviated month name to 1–12.
pub fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
