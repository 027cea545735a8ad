//! Calendar backend wire types.
//!
//! All datetimes are local wall-clock times in the timezone the request was
//! made in; the zone itself travels alongside as an IANA name.

use chrono::{Duration, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// An existing event that overlaps a queried window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Conflict {
    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end && end > self.start
    }
}

/// Result of an availability query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub available: bool,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
}

impl AvailabilityReport {
    pub fn free() -> Self {
        Self {
            available: true,
            conflicts: Vec::new(),
        }
    }

    pub fn busy(conflicts: Vec<Conflict>) -> Self {
        Self {
            available: conflicts.is_empty(),
            conflicts,
        }
    }
}

/// Request to create a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub title: String,
    pub timezone: Tz,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EventRequest {
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// An event as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub timezone: Tz,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
