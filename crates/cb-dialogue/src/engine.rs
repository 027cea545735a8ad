//! Per-turn routing and multi-turn slot filling.
//!
//! The engine is stateless: each call takes the session's
//! `ConversationState` by value and hands back the updated one with the
//! reply. Three implicit modes fall out of that state:
//!
//! - **idle**: classify the utterance and dispatch.
//! - **availability follow-up**: `last_topic == availability` and the user
//!   continues ("what about Friday"); missing date/time are inherited.
//! - **booking in progress**: every turn feeds the partial booking until
//!   title, date, time and duration are known, then the event is created.

use std::sync::{Arc, LazyLock};

use cb_nlp::{ExtractionResult, Intent, classify, duration, extract, time};
use cb_protocol::{BookingField, BookingInfo, ConversationState, EventRequest, Topic};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use regex::Regex;

use crate::backend::CalendarBackend;
use crate::fallback::{FallbackResponder, ResponseKind};
use crate::slots;

/// Reply to an empty message.
pub const EMPTY_MESSAGE_REPLY: &str =
    "I'm here to help! Please tell me what you'd like to do with your calendar.";

const UNRESOLVED_DATE_REPLY: &str =
    "I couldn't understand the date. Could you specify it more clearly?";

const REVERSED_RANGE_REPLY: &str =
    "The end time needs to be after the start time. Could you give me the time range again?";

const CANCELLED_REPLY: &str = "Okay, I've dropped that booking. What else can I do for you?";

const BUSINESS_HOURS: (u32, u32) = (9, 17);

/// Free slots listed in a busy reply.
const REPORTED_SLOTS: usize = 5;

static RE_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:what about|how about|and|that day|then|after that)\b").unwrap()
});

static RE_CANCEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:cancel|never ?mind|forget it)\b").unwrap());

static RE_SLOT_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:the\s+)?(first|second|third|fourth|fifth|1st|2nd|3rd|4th|5th)\s+(?:slot|one|option)\b",
    )
    .unwrap()
});

/// Exact follow-ups that only make sense after an availability check.
const DAY_AFTER_PHRASES: &[&str] = &[
    "day after tomorrow",
    "day after",
    "what about day after tomorrow",
    "and day after",
];

/// One utterance with everything derived from it up front.
struct Turn<'a> {
    text: &'a str,
    /// Lowercased, whitespace-collapsed, trailing punctuation removed.
    lower: String,
    tz: Tz,
    /// `now` as local wall-clock time in `tz`.
    reference: NaiveDateTime,
}

/// A concrete availability query window.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Window {
    start: NaiveDateTime,
    end: NaiveDateTime,
    label: String,
}

/// Drives one conversation turn at a time against a calendar backend.
pub struct DialogueEngine {
    calendar: Arc<dyn CalendarBackend>,
    fallback: Arc<dyn FallbackResponder>,
    default_tz: Tz,
}

impl DialogueEngine {
    pub fn new(
        calendar: Arc<dyn CalendarBackend>,
        fallback: Arc<dyn FallbackResponder>,
        default_tz: Tz,
    ) -> Self {
        Self {
            calendar,
            fallback,
            default_tz,
        }
    }

    pub fn default_timezone(&self) -> Tz {
        self.default_tz
    }

    /// Parse an IANA zone name, falling back to the default.
    pub fn resolve_timezone(&self, name: Option<&str>) -> Tz {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return self.default_tz;
        };
        match name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!(timezone = name, default = %self.default_tz, "unknown timezone, using default");
                self.default_tz
            }
        }
    }

    /// Handle one utterance at the current instant.
    pub async fn process_turn(
        &self,
        state: ConversationState,
        utterance: &str,
        timezone: Option<&str>,
    ) -> (String, ConversationState) {
        self.process_turn_at(state, utterance, timezone, Utc::now()).await
    }

    /// Handle one utterance with `now` pinned.
    pub async fn process_turn_at(
        &self,
        mut state: ConversationState,
        utterance: &str,
        timezone: Option<&str>,
        now: DateTime<Utc>,
    ) -> (String, ConversationState) {
        let text = utterance.trim();
        if text.is_empty() {
            return (EMPTY_MESSAGE_REPLY.to_string(), state);
        }

        let tz = self.resolve_timezone(timezone);
        let turn = Turn {
            text,
            lower: normalize(text),
            tz,
            reference: now.with_timezone(&tz).naive_local(),
        };

        let reply = self.route(&mut state, &turn).await;
        tracing::debug!(
            topic = ?state.last_topic,
            booking_in_progress = state.booking_in_progress,
            "turn handled"
        );
        (reply, state)
    }

    async fn route(&self, state: &mut ConversationState, turn: &Turn<'_>) -> String {
        let continuation = RE_CONTINUATION.is_match(&turn.lower);
        let day_after = DAY_AFTER_PHRASES.contains(&turn.lower.as_str());

        if state.booking_in_progress {
            if RE_CANCEL.is_match(&turn.lower) {
                tracing::info!("booking cancelled by user");
                state.clear_booking();
                state.last_topic = Topic::None;
                return CANCELLED_REPLY.to_string();
            }
            if !continuation && !day_after && classify(turn.text) == Intent::Availability {
                tracing::info!("availability question during booking, leaving booking mode");
                state.booking_in_progress = false;
                return self.availability(state, turn, false).await;
            }
            return self.booking(state, turn).await;
        }

        if continuation || day_after {
            match state.last_topic {
                Topic::Booking => return self.booking(state, turn).await,
                Topic::Availability => return self.availability(state, turn, true).await,
                _ if day_after => {
                    return self
                        .fallback
                        .generate(turn.text, ResponseKind::Availability)
                        .await;
                }
                _ => {}
            }
        }

        let intent = classify(turn.text);
        tracing::info!(?intent, "intent classified");
        match intent {
            Intent::Availability => self.availability(state, turn, false).await,
            Intent::Booking => self.booking(state, turn).await,
            Intent::Casual => self.casual(state, turn).await,
        }
    }

    // ── Availability ───────────────────────────────────────────

    async fn availability(
        &self,
        state: &mut ConversationState,
        turn: &Turn<'_>,
        follow_up: bool,
    ) -> String {
        let found = extract(turn.text, turn.reference);
        state.last_topic = Topic::Availability;

        if found.has_unresolved_date() {
            return UNRESOLVED_DATE_REPLY.to_string();
        }

        let inherited_date = if follow_up { state.last_availability_date } else { None };
        let inherited_time = if follow_up { state.last_time_mentioned } else { None };
        let date = found
            .date
            .or(inherited_date)
            .unwrap_or_else(|| turn.reference.date());
        let start = found.time_start.or(inherited_time);

        let Some(window) = window(date, start, found.time_end) else {
            return REVERSED_RANGE_REPLY.to_string();
        };

        remember(state, &found);
        state.last_availability_date = Some(date);
        state.last_date_mentioned = Some(date);
        if start.is_some() {
            state.last_time_mentioned = start;
        }

        let report = match self
            .calendar
            .check_availability(window.start, window.end, turn.tz)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = self.calendar.backend_name(),
                    "availability check failed"
                );
                return format!("Error checking availability: {e}");
            }
        };

        let day = date.format("%A, %B %d, %Y");
        let free: Vec<String> = slots::free_slots(date, &report.conflicts)
            .into_iter()
            .map(|slot| time::format_12h(slot.time()))
            .collect();

        if report.available {
            state.available_slots = match start {
                Some(start) => vec![time::format_12h(start)],
                None => free,
            };
            return format!("Yes, you're free on {day} {}!", window.label);
        }

        tracing::debug!(conflicts = report.conflicts.len(), free = free.len(), "window is busy");
        let suggestion = if free.is_empty() {
            "No available slots found for this day.".to_string()
        } else {
            let listed: Vec<String> = free
                .iter()
                .take(REPORTED_SLOTS)
                .map(|slot| format!("- {slot}"))
                .collect();
            format!("Alternative times available:\n{}", listed.join("\n"))
        };
        state.available_slots = free;
        format!("You're busy on {day} {}.\n\n{suggestion}", window.label)
    }

    // ── Booking ────────────────────────────────────────────────

    async fn booking(&self, state: &mut ConversationState, turn: &Turn<'_>) -> String {
        state.last_topic = Topic::Booking;

        let update = match duration::duration_only(turn.text) {
            Some(minutes) => BookingInfo {
                duration_minutes: Some(minutes),
                ..BookingInfo::default()
            },
            None => booking_update(state, turn),
        };
        if update.duration_minutes.is_some() {
            state.last_duration_minutes = update.duration_minutes;
        }
        state.accumulated_booking_info.merge(&update);
        fill_from_context(state);

        let info = state.accumulated_booking_info.clone();
        let (Some(title), Some(date), Some(start), Some(minutes)) =
            (info.title, info.date, info.time, info.duration_minutes)
        else {
            state.booking_in_progress = true;
            let missing = state.accumulated_booking_info.missing_fields();
            tracing::debug!(?missing, "booking incomplete");
            return missing_fields_reply(&missing);
        };

        let request = EventRequest {
            start: date.and_time(start),
            duration_minutes: minutes,
            title,
            timezone: turn.tz,
            location: info.location,
        };

        match self.calendar.create_event(&request).await {
            Ok(record) => {
                tracing::info!(event_id = %record.id, title = %record.title, "event booked");
                state.clear_booking();
                let mut reply = format!(
                    "Meeting '{}' scheduled for {} ({minutes} minutes)!",
                    record.title,
                    record.start.format("%A, %B %d at %I:%M %p")
                );
                if let Some(location) = &record.location {
                    reply.push_str(&format!(" Location: {location}."));
                }
                reply
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = self.calendar.backend_name(),
                    "event creation failed"
                );
                state.booking_in_progress = true;
                e.to_string()
            }
        }
    }

    // ── Casual ─────────────────────────────────────────────────

    async fn casual(&self, state: &mut ConversationState, turn: &Turn<'_>) -> String {
        state.last_topic = Topic::Casual;
        let found = extract(turn.text, turn.reference);
        if found.date.is_some() {
            state.last_date_mentioned = found.date;
        }
        if found.time_start.is_some() {
            state.last_time_mentioned = found.time_start;
        }
        self.fallback.generate(turn.text, ResponseKind::Casual).await
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.' | ','))
        .to_string()
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Query window for a date and optional start/end. `None` when the end
/// does not come after the start.
fn window(date: NaiveDate, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Option<Window> {
    match (start, end) {
        (None, _) => Some(Window {
            start: date.and_time(hour(BUSINESS_HOURS.0)),
            end: date.and_time(hour(BUSINESS_HOURS.1)),
            label: "during business hours".to_string(),
        }),
        (Some(start), None) => {
            let start_at = date.and_time(start);
            let end_of_day = date.and_time(NaiveTime::MIN) + Duration::days(1);
            Some(Window {
                start: start_at,
                end: (start_at + Duration::hours(1)).min(end_of_day),
                label: format!("around {}", time::format_12h(start)),
            })
        }
        (Some(start), Some(end)) if end <= start => None,
        (Some(start), Some(end)) => Some(Window {
            start: date.and_time(start),
            end: date.and_time(end),
            label: format!("from {} to {}", time::format_12h(start), time::format_12h(end)),
        }),
    }
}

/// Carry mentioned entities forward for later turns.
fn remember(state: &mut ConversationState, found: &ExtractionResult) {
    if found.date.is_some() {
        state.last_date_mentioned = found.date;
    }
    if found.time_start.is_some() {
        state.last_time_mentioned = found.time_start;
    }
    if found.duration_minutes.is_some() {
        state.last_duration_minutes = found.duration_minutes;
    }
    if found.title.is_some() {
        state.last_title.clone_from(&found.title);
    }
}

/// Booking fields from a full utterance, honouring "the second slot".
fn booking_update(state: &mut ConversationState, turn: &Turn<'_>) -> BookingInfo {
    let (text, slot) = take_slot_reference(turn.text, &state.available_slots);
    let found = extract(&text, turn.reference);
    remember(state, &found);

    let mut update = BookingInfo {
        title: found.title,
        date: found.date,
        time: found.time_start,
        duration_minutes: found.duration_minutes,
        location: found.location,
    };
    if let Some(slot) = slot {
        update.time = Some(slot);
        if update.date.is_none() {
            update.date = state.last_availability_date;
        }
    }
    update
}

/// Strip an ordinal slot reference from `text`, resolving it against the
/// slots listed by the last availability check.
fn take_slot_reference(text: &str, slots: &[String]) -> (String, Option<NaiveTime>) {
    let Some(caps) = RE_SLOT_REFERENCE.captures(text) else {
        return (text.to_string(), None);
    };
    let index = match caps[1].to_lowercase().as_str() {
        "first" | "1st" => 0,
        "second" | "2nd" => 1,
        "third" | "3rd" => 2,
        "fourth" | "4th" => 3,
        _ => 4,
    };
    let slot = slots
        .get(index)
        .and_then(|s| NaiveTime::parse_from_str(s, "%I:%M %p").ok());
    (RE_SLOT_REFERENCE.replace(text, " ").into_owned(), slot)
}

/// Fill gaps in the partial booking from earlier turns.
fn fill_from_context(state: &mut ConversationState) {
    let info = &mut state.accumulated_booking_info;
    if info.title.is_none() {
        info.title.clone_from(&state.last_title);
    }
    info.date = info
        .date
        .or(state.last_date_mentioned)
        .or(state.last_availability_date);
    info.time = info.time.or(state.last_time_mentioned);
    info.duration_minutes = info.duration_minutes.or(state.last_duration_minutes);
}

fn missing_fields_reply(missing: &[BookingField]) -> String {
    let names: Vec<&str> = missing.iter().map(BookingField::as_str).collect();
    format!(
        "To schedule this meeting, I need more information about: {}.",
        names.join(", ")
    )
}
