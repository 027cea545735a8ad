//! Duration resolution in minutes.

use regex::Regex;
use std::sync::LazyLock;

static RE_HOUR_AND_HALF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:an|one|1)\s*hours?\s+and\s+a\s+half\b").unwrap());

static RE_AN_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:an|one)\s+hour\b").unwrap());

static RE_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+)\s*(hours?|hrs?|minutes?|mins?)\b").unwrap()
});

// A standalone common meeting length, not part of a time like "2:30".
static RE_STANDALONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(30|60|90|120)(?:$|\s|[?.!,])").unwrap());

static RE_DURATION_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:for\s+)?(?:half an hour|an hour|one hour|(?:an|one|1)\s*hours?\s+and\s+a\s+half|\d+\s*(?:hours?|hrs?|minutes?|mins?))$",
    )
    .unwrap()
});

type DurationRule = fn(&str) -> Option<u32>;

/// Duration rules in priority order; the standalone-number pass runs last.
pub const RULES: &[(&str, DurationRule)] = &[
    ("half_hour", half_hour),
    ("hour_and_half", hour_and_half),
    ("an_hour", an_hour),
    ("with_unit", with_unit),
    ("standalone", standalone),
];

/// Resolve a duration mentioned anywhere in `text`.
pub fn resolve(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    RULES.iter().find_map(|(_, rule)| rule(&lower))
}

/// Minutes for a message that is nothing but a duration ("30", "45 mins",
/// "an hour"). A bare number is taken as minutes.
pub fn duration_only(text: &str) -> Option<u32> {
    let cleaned = text
        .trim()
        .trim_matches(|c: char| matches!(c, '?' | '!' | '.' | ','))
        .to_lowercase();

    if let Ok(minutes) = cleaned.parse::<u32>() {
        return (minutes > 0).then_some(minutes);
    }
    if RE_DURATION_ONLY.is_match(&cleaned) {
        return resolve(&cleaned);
    }
    None
}

fn half_hour(text: &str) -> Option<u32> {
    text.contains("half an hour").then_some(30)
}

fn hour_and_half(text: &str) -> Option<u32> {
    RE_HOUR_AND_HALF.is_match(text).then_some(90)
}

fn an_hour(text: &str) -> Option<u32> {
    RE_AN_HOUR.is_match(text).then_some(60)
}

fn with_unit(text: &str) -> Option<u32> {
    let caps = RE_WITH_UNIT.captures(text)?;
    let amount: u32 = caps[1].parse().ok()?;
    if amount == 0 {
        return None;
    }
    if caps[2].starts_with('h') {
        amount.checked_mul(60)
    } else {
        Some(amount)
    }
}

fn standalone(text: &str) -> Option<u32> {
    RE_STANDALONE.captures(text)?[1].parse().ok()
}
