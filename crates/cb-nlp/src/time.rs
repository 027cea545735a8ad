//! Clock time resolution ("3pm", "2:30 PM", "14:30", "afternoon").

use chrono::NaiveTime;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::error::{EntityKind, NlpError, NlpResult};

/// Named periods and their fixed anchors. Checked by substring, so longer
/// names that contain shorter ones come first.
const PERIODS: &[(&str, u32)] = &[
    ("morning", 9),
    ("afternoon", 14),
    ("evening", 18),
    ("midnight", 0),
    ("night", 20),
    ("noon", 12),
];

type TimeRule = fn(&Captures<'_>) -> Option<NaiveTime>;

static RULES: LazyLock<Vec<(Regex, TimeRule)>> = LazyLock::new(|| {
    let rule = |pattern: &str, convert: TimeRule| (Regex::new(pattern).unwrap(), convert);
    vec![
        rule(r"^(?P<h>\d{1,2})(?P<p>am|pm)$", twelve_hour),
        rule(r"^(?P<h>\d{1,2}) (?P<p>am|pm)$", twelve_hour),
        rule(r"^(?P<h>\d{1,2}):(?P<m>\d{2})(?P<p>am|pm)$", twelve_hour),
        rule(r"^(?P<h>\d{1,2}):(?P<m>\d{2}) (?P<p>am|pm)$", twelve_hour),
        rule(r"^(?P<h>\d{1,2}):(?P<m>\d{2})$", twenty_four_hour),
    ]
});

/// Resolve a time phrase to a 24-hour clock time.
pub fn resolve(phrase: &str) -> NlpResult<NaiveTime> {
    let cleaned = phrase
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(time) = period(&cleaned) {
        return Ok(time);
    }

    RULES
        .iter()
        .find_map(|(re, convert)| re.captures(&cleaned).and_then(|caps| convert(&caps)))
        .ok_or_else(|| NlpError::unresolvable(EntityKind::Time, phrase.trim()))
}

/// Fixed anchor for a named period appearing anywhere in the phrase.
pub fn period(phrase: &str) -> Option<NaiveTime> {
    PERIODS
        .iter()
        .find(|(name, _)| phrase.contains(name))
        .and_then(|(_, hour)| NaiveTime::from_hms_opt(*hour, 0, 0))
}

fn minute(caps: &Captures<'_>) -> Option<u32> {
    caps.name("m").map_or(Some(0), |m| m.as_str().parse().ok())
}

fn twelve_hour(caps: &Captures<'_>) -> Option<NaiveTime> {
    let hour: u32 = caps["h"].parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let offset = if &caps["p"] == "pm" { 12 } else { 0 };
    NaiveTime::from_hms_opt(hour % 12 + offset, minute(caps)?, 0)
}

fn twenty_four_hour(caps: &Captures<'_>) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(caps["h"].parse().ok()?, minute(caps)?, 0)
}

/// `HH:MM`, 24-hour.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// `HH:MM AM`, 12-hour with zero-padded hour.
pub fn format_12h(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hhmm(phrase: &str) -> String {
        format_hhmm(resolve(phrase).unwrap())
    }

    #[test]
    fn twelve_hour_forms() {
        assert_eq!(hhmm("3pm"), "15:00");
        assert_eq!(hhmm("3 PM"), "15:00");
        assert_eq!(hhmm("2:30pm"), "14:30");
        assert_eq!(hhmm("9:05  am"), "09:05");
        assert_eq!(hhmm("11am"), "11:00");
    }

    #[test]
    fn noon_and_midnight_hours() {
        assert_eq!(hhmm("12pm"), "12:00");
        assert_eq!(hhmm("12am"), "00:00");
        assert_eq!(hhmm("12:45 am"), "00:45");
    }

    #[test]
    fn twenty_four_hour_is_idempotent() {
        assert_eq!(hhmm("14:30"), "14:30");
        assert_eq!(hhmm(&hhmm("14:30")), "14:30");
        assert_eq!(hhmm("9:00"), "09:00");
    }

    #[test]
    fn named_periods() {
        assert_eq!(hhmm("morning"), "09:00");
        assert_eq!(hhmm("tomorrow afternoon"), "14:00");
        assert_eq!(hhmm("evening"), "18:00");
        assert_eq!(hhmm("tonight"), "20:00");
        assert_eq!(hhmm("noon"), "12:00");
        assert_eq!(hhmm("midnight"), "00:00");
    }

    #[test]
    fn out_of_range_fails() {
        assert!(resolve("25:00").is_err());
        assert!(resolve("10:75").is_err());
        assert!(resolve("13pm").is_err());
        assert!(resolve("0am").is_err());
    }

    #[test]
    fn unmatched_fails() {
        assert!(resolve("3").is_err());
        assert!(resolve("later").is_err());
        assert!(resolve("").is_err());
        let err = resolve(" soonish ").unwrap_err();
        assert_eq!(err, NlpError::unresolvable(EntityKind::Time, "soonish"));
    }

    #[test]
    fn twelve_hour_display() {
        let t = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        assert_eq!(format_12h(t), "02:00 PM");
        assert_eq!(format_12h(NaiveTime::from_hms_opt(9, 0, 0).unwrap()), "09:00 AM");
    }
}
