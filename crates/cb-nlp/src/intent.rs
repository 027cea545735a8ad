//! Keyword-based intent classification.

use serde::{Deserialize, Serialize};

/// What the user is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Availability,
    Booking,
    Casual,
}

const AVAILABILITY_KEYWORDS: &[&str] = &[
    "available",
    "free",
    "availability",
    "busy",
    "schedule",
    "am i free",
    "are you free",
    "check my",
    "what time",
    "when am i",
    "do i have",
    "any meetings",
    "open slots",
    "time slots",
    "what about",
];

// Any of these vetoes the availability branch, so "schedule" never reaches it.
const BOOKING_ACTIONS: &[&str] = &["book", "schedule", "create", "set up", "arrange", "plan"];

const BOOKING_KEYWORDS: &[&str] = &[
    "book",
    "schedule",
    "set up",
    "create",
    "arrange",
    "plan",
    "meeting with",
    "call with",
    "event",
    "reserve",
    "add to calendar",
];

/// Classify an utterance. Availability is checked first.
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();

    if matches_any(&lower, AVAILABILITY_KEYWORDS) && !matches_any(&lower, BOOKING_ACTIONS) {
        return Intent::Availability;
    }
    if matches_any(&lower, BOOKING_KEYWORDS) {
        return Intent::Booking;
    }
    Intent::Casual
}

/// Check if the text contains any of the given patterns.
pub fn matches_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_questions() {
        assert_eq!(classify("Am I free tomorrow afternoon?"), Intent::Availability);
        assert_eq!(classify("Do I have anything on Friday"), Intent::Availability);
        assert_eq!(classify("any meetings next week tuesday?"), Intent::Availability);
        assert_eq!(classify("Are you BUSY at 3pm"), Intent::Availability);
    }

    #[test]
    fn booking_requests() {
        assert_eq!(classify("book a meeting with John"), Intent::Booking);
        assert_eq!(classify("Set up a call with Priya tomorrow"), Intent::Booking);
        assert_eq!(classify("reserve 2pm for the design review"), Intent::Booking);
        assert_eq!(classify("add to calendar: dentist"), Intent::Booking);
    }

    #[test]
    fn schedule_always_routes_to_booking() {
        assert_eq!(classify("schedule"), Intent::Booking);
        assert_eq!(classify("what's my schedule tomorrow"), Intent::Booking);
    }

    #[test]
    fn booking_action_vetoes_availability() {
        assert_eq!(classify("book me when I'm free tomorrow"), Intent::Booking);
    }

    #[test]
    fn availability_wins_over_booking_phrasing_without_veto() {
        // "meeting with" is booking phrasing but not a booking action.
        assert_eq!(classify("am I free for a meeting with Sam?"), Intent::Availability);
    }

    #[test]
    fn casual_fallthrough() {
        assert_eq!(classify("hello there"), Intent::Casual);
        assert_eq!(classify("thanks!"), Intent::Casual);
        assert_eq!(classify(""), Intent::Casual);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(Intent::Availability).unwrap(),
            "availability"
        );
    }
}
