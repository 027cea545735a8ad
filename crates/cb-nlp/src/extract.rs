//! Entity extraction: date, time range, duration, title and location.
//!
//! Each entity is extracted independently and best-effort; a missing or
//! unresolvable date never stops the time or title from being found.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::date::{self, MONTH_PATTERN, WEEKDAY_PATTERN, WEEKDAYS};
use crate::{duration, time};

/// Everything found in one utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Raw date phrase as matched, even when it could not be resolved.
    pub date_phrase: Option<String>,
    pub date: Option<NaiveDate>,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
    pub title: Option<String>,
    pub location: Option<String>,
}

impl ExtractionResult {
    /// A date phrase was present but did not resolve.
    pub fn has_unresolved_date(&self) -> bool {
        self.date_phrase.is_some() && self.date.is_none()
    }
}

// ── Patterns ───────────────────────────────────────────────────

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:day after tomorrow|day after)\b".to_string(),
        r"\b(?:today|tomorrow|yesterday)\b".to_string(),
        format!(r"\b(?:this|next|coming)\s+week\s+(?:{WEEKDAY_PATTERN})\b"),
        format!(r"\b(?:this|next|coming)\s+(?:{WEEKDAY_PATTERN})\b"),
        r"\b(?:this|next|coming)\s+(?:week|month)\b".to_string(),
        format!(r"\b(?:{WEEKDAY_PATTERN})\b"),
        format!(r"\b(?:{MONTH_PATTERN})\s+\d{{1,2}}(?:st|nd|rd|th)?\b(?:,?\s+20\d{{2}}\b)?"),
        format!(r"\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{MONTH_PATTERN})\b(?:,?\s+20\d{{2}}\b)?"),
        r"\b\d{4}-\d{2}-\d{2}\b".to_string(),
        r"\b(?:coming|next)\s+\d{1,2}(?:st|nd|rd|th)?\b".to_string(),
        r"\bon\s+(?:the\s+)?\d{1,2}(?:st|nd|rd|th)?\b|\b\d{1,2}(?:st|nd|rd|th)\b".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const CLOCK: &str = r"\d{1,2}(?::\d{2})?\s*(?:am|pm)?";

static RE_TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({CLOCK})\s*(?:to|-|until)\s*({CLOCK})\b")).unwrap()
});

static TIME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(\d{1,2}(?::\d{2})?\s*(?:am|pm))\b",
        r"\b(\d{1,2}:\d{2})\b",
        r"\b(morning|afternoon|evening|tonight|night|noon|midnight)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"meeting with ([^,\s]+)",
        r"call with ([^,\s]+)",
        r"([\w\s]+) meeting",
        r"schedule ([\w\s]+)",
        r"book ([\w\s]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static RE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:location|venue)\s*(?:is\s+|:\s*|\s)\s*([^,.;!?]+)").unwrap()
});

/// Leading words dropped from a title capture.
const TITLE_FILLER: &[&str] = &[
    "a", "an", "the", "my", "our", "me", "us", "it", "this", "that", "new", "please", "book",
    "schedule", "set", "up", "arrange", "plan", "create", "reserve", "i", "want", "to", "need",
    "would", "like", "can", "you", "could", "let's", "lets", "quick", "with",
];

/// Words that end a title capture.
const TITLE_STOP: &[&str] = &[
    "on", "at", "for", "from", "to", "in", "by", "around", "between", "until", "today",
    "tomorrow", "tonight", "yesterday", "next", "this", "coming", "day", "morning", "afternoon",
    "evening", "night", "noon", "midnight",
];

// ── Extraction ─────────────────────────────────────────────────

/// Extract all entities from `text`, resolving dates against `reference`.
pub fn extract(text: &str, reference: NaiveDateTime) -> ExtractionResult {
    let lower = text.to_lowercase();

    let date_phrase = extract_date_phrase(&lower);
    let date = date_phrase
        .as_deref()
        .and_then(|phrase| date::resolve(phrase, reference).ok());
    let (time_start, time_end) = extract_times(&lower);
    // The day number in "june 30" is not a duration.
    let duration_minutes = match date_phrase.as_deref() {
        Some(phrase) => duration::resolve(&lower.replacen(phrase, " ", 1)),
        None => duration::resolve(&lower),
    };

    let result = ExtractionResult {
        date_phrase,
        date,
        time_start,
        time_end,
        duration_minutes,
        title: extract_title(&lower),
        location: extract_location(text),
    };
    tracing::debug!(?result, "entities extracted");
    result
}

/// First date phrase in the (lowercased) text.
pub fn extract_date_phrase(lower: &str) -> Option<String> {
    if lower.contains("next week")
        && let Some(day) = WEEKDAYS.iter().find(|day| lower.contains(*day))
    {
        return Some(format!("next week {day}"));
    }

    DATE_PATTERNS
        .iter()
        .find_map(|re| re.find(lower))
        .map(|m| m.as_str().to_string())
}

/// Start/end times. The first range whose ends both resolve wins.
pub fn extract_times(lower: &str) -> (Option<NaiveTime>, Option<NaiveTime>) {
    for caps in RE_TIME_RANGE.captures_iter(lower) {
        let end_raw = caps[2].trim();
        let mut start_raw = caps[1].trim().to_string();
        // "2 to 4pm" → the start borrows the end's meridiem.
        if !start_raw.ends_with("am") && !start_raw.ends_with("pm") {
            if end_raw.ends_with("am") {
                start_raw.push_str("am");
            } else if end_raw.ends_with("pm") {
                start_raw.push_str("pm");
            }
        }
        if let (Ok(start), Ok(end)) = (time::resolve(&start_raw), time::resolve(end_raw)) {
            return (Some(start), Some(end));
        }
    }

    let start = TIME_PATTERNS
        .iter()
        .filter_map(|re| re.captures(lower))
        .find_map(|caps| time::resolve(&caps[1]).ok());
    (start, None)
}

/// First title candidate, cleaned and title-cased.
pub fn extract_title(lower: &str) -> Option<String> {
    TITLE_PATTERNS
        .iter()
        .filter_map(|re| re.captures(lower))
        .find_map(|caps| clean_title(&caps[1]))
}

fn clean_title(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|w| !w.is_empty())
        .skip_while(|w| TITLE_FILLER.contains(w))
        .take_while(|w| {
            !TITLE_STOP.contains(w)
                && !WEEKDAYS.contains(w)
                && date::month_number(w).is_none()
                && !w.chars().any(|c| c.is_ascii_digit())
        })
        .collect();

    if words.is_empty() {
        return None;
    }
    Some(words.iter().map(|w| title_case(w)).collect::<Vec<_>>().join(" "))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `location is X`, `location: X`, `venue X`.
pub fn extract_location(text: &str) -> Option<String> {
    let caps = RE_LOCATION.captures(text)?;
    let location = caps[1].trim();
    (!location.is_empty()).then(|| location.to_string())
}
