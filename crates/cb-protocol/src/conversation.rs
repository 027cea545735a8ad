use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Conversational category of the last handled turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Availability,
    Booking,
    Casual,
    #[default]
    None,
}

/// A required booking field. Declaration order is the order fields are
/// reported to the user when missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingField {
    Title,
    Date,
    Time,
    Duration,
}

impl BookingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Date => "date",
            Self::Time => "time",
            Self::Duration => "duration",
        }
    }
}

impl std::fmt::Display for BookingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial booking fields gathered across turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl BookingInfo {
    /// Overwrite fields that are present in `newer`; absent fields never
    /// erase what is already known.
    pub fn merge(&mut self, newer: &BookingInfo) {
        if newer.title.is_some() {
            self.title.clone_from(&newer.title);
        }
        if newer.date.is_some() {
            self.date = newer.date;
        }
        if newer.time.is_some() {
            self.time = newer.time;
        }
        if newer.duration_minutes.is_some() {
            self.duration_minutes = newer.duration_minutes;
        }
        if newer.location.is_some() {
            self.location.clone_from(&newer.location);
        }
    }

    /// Required fields that are still unset, in reporting order.
    pub fn missing_fields(&self) -> Vec<BookingField> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push(BookingField::Title);
        }
        if self.date.is_none() {
            missing.push(BookingField::Date);
        }
        if self.time.is_none() {
            missing.push(BookingField::Time);
        }
        if self.duration_minutes.is_none() {
            missing.push(BookingField::Duration);
        }
        missing
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-session conversation memory.
///
/// Owned by the session and threaded through each turn by value; the
/// dialogue engine is the only writer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub last_topic: Topic,
    #[serde(default)]
    pub last_date_mentioned: Option<NaiveDate>,
    #[serde(default)]
    pub last_time_mentioned: Option<NaiveTime>,
    #[serde(default)]
    pub last_duration_minutes: Option<u32>,
    #[serde(default)]
    pub last_title: Option<String>,
    /// 12-hour slot starts ("10:00 AM") from the latest availability check.
    #[serde(default)]
    pub available_slots: Vec<String>,
    #[serde(default)]
    pub last_availability_date: Option<NaiveDate>,
    #[serde(default)]
    pub booking_in_progress: bool,
    #[serde(default)]
    pub accumulated_booking_info: BookingInfo,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the partial booking and leave booking mode.
    pub fn clear_booking(&mut self) {
        self.accumulated_booking_info = BookingInfo::default();
        self.booking_in_progress = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut acc = BookingInfo {
            title: Some("John".into()),
            date: Some(date(2026, 10, 20)),
            ..Default::default()
        };
        acc.merge(&BookingInfo {
            time: NaiveTime::from_hms_opt(15, 0, 0),
            ..Default::default()
        });
        assert_eq!(acc.title.as_deref(), Some("John"));
        assert_eq!(acc.date, Some(date(2026, 10, 20)));
        assert_eq!(acc.time, NaiveTime::from_hms_opt(15, 0, 0));

        acc.merge(&BookingInfo {
            title: Some("Design Review".into()),
            ..Default::default()
        });
        assert_eq!(acc.title.as_deref(), Some("Design Review"));
        assert_eq!(acc.date, Some(date(2026, 10, 20)));
    }

    #[test]
    fn missing_fields_in_reporting_order() {
        let info = BookingInfo {
            title: Some("John".into()),
            ..Default::default()
        };
        assert_eq!(
            info.missing_fields(),
            vec![BookingField::Date, BookingField::Time, BookingField::Duration]
        );
        assert!(BookingInfo::default().is_empty());
    }

    #[test]
    fn location_is_not_required() {
        let info = BookingInfo {
            title: Some("Sync".into()),
            date: Some(date(2026, 1, 5)),
            time: NaiveTime::from_hms_opt(9, 30, 0),
            duration_minutes: Some(45),
            location: None,
        };
        assert!(info.missing_fields().is_empty());
    }

    #[test]
    fn clear_booking_keeps_context() {
        let mut state = ConversationState {
            last_topic: Topic::Booking,
            last_title: Some("John".into()),
            booking_in_progress: true,
            accumulated_booking_info: BookingInfo {
                title: Some("John".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        state.clear_booking();
        assert!(!state.booking_in_progress);
        assert!(state.accumulated_booking_info.is_empty());
        assert_eq!(state.last_title.as_deref(), Some("John"));
        assert_eq!(state.last_topic, Topic::Booking);
    }

    #[test]
    fn state_serializes_topic_snake_case() {
        let state = ConversationState {
            last_topic: Topic::Availability,
            last_date_mentioned: Some(date(2026, 10, 23)),
            ..Default::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["last_topic"], "availability");
        assert_eq!(json["last_date_mentioned"], "2026-10-23");
        assert_eq!(json["booking_in_progress"], false);

        let back: ConversationState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn field_display() {
        assert_eq!(BookingField::Duration.to_string(), "duration");
        assert_eq!(serde_json::to_value(Topic::None).unwrap(), "none");
    }
}
