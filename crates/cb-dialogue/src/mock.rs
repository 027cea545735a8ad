//! In-memory calendar used for local development and tests.

use async_trait::async_trait;
use cb_protocol::{AvailabilityReport, Conflict, EventRecord, EventRequest};
use chrono::{Duration, NaiveDateTime};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::{CalendarBackend, CollaboratorError};

/// Alternatives are probed in 30-minute steps over the next four hours.
const ALTERNATIVE_STEP_MINUTES: i64 = 30;
const ALTERNATIVE_PROBES: i64 = 8;
const MAX_ALTERNATIVES: usize = 3;

#[derive(Default)]
struct Inner {
    events: Vec<EventRecord>,
    fail_next: Option<String>,
}

/// Calendar that keeps events in memory. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MockCalendar {
    inner: Arc<RwLock<Inner>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event directly, bypassing conflict checks.
    pub async fn seed(&self, title: &str, start: NaiveDateTime, end: NaiveDateTime, tz: Tz) {
        let record = EventRecord {
            id: uuid::Uuid::now_v7().to_string(),
            title: title.to_string(),
            start,
            end,
            timezone: tz,
            location: None,
        };
        self.inner.write().await.events.push(record);
    }

    /// Make the next backend call fail with `message`.
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.inner.write().await.fail_next = Some(message.into());
    }

    /// Snapshot of all stored events.
    pub async fn events(&self) -> Vec<EventRecord> {
        self.inner.read().await.events.clone()
    }

    async fn take_failure(&self) -> Result<(), CollaboratorError> {
        match self.inner.write().await.fail_next.take() {
            Some(message) => Err(CollaboratorError(message)),
            None => Ok(()),
        }
    }
}

fn conflicts_in(events: &[EventRecord], start: NaiveDateTime, end: NaiveDateTime) -> Vec<Conflict> {
    events
        .iter()
        .map(|e| Conflict {
            title: e.title.clone(),
            start: e.start,
            end: e.end,
        })
        .filter(|c| c.overlaps(start, end))
        .collect()
}

fn rejection_message(conflicts: &[Conflict], alternatives: &[NaiveDateTime]) -> String {
    let mut message = String::from("Time slot not available! Conflicting with:");
    for c in conflicts {
        message.push_str(&format!(
            "\n  - '{}' from {} to {}",
            c.title,
            c.start.format("%Y-%m-%d %H:%M"),
            c.end.format("%Y-%m-%d %H:%M")
        ));
    }

    if alternatives.is_empty() {
        message.push_str(
            "\n\nNo alternative slots found in the next 4 hours. Please try a different time.",
        );
    } else {
        message.push_str("\n\nAlternative time slots available:");
        for alt in alternatives {
            message.push_str(&format!("\n  - {}", alt.format("%Y-%m-%d %H:%M")));
        }
    }
    message
}

#[async_trait]
impl CalendarBackend for MockCalendar {
    async fn check_availability(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        _tz: Tz,
    ) -> Result<AvailabilityReport, CollaboratorError> {
        self.take_failure().await?;
        let inner = self.inner.read().await;
        Ok(AvailabilityReport::busy(conflicts_in(&inner.events, start, end)))
    }

    async fn create_event(&self, request: &EventRequest) -> Result<EventRecord, CollaboratorError> {
        self.take_failure().await?;
        let mut inner = self.inner.write().await;

        let conflicts = conflicts_in(&inner.events, request.start, request.end());
        if !conflicts.is_empty() {
            let length = request.end() - request.start;
            let alternatives: Vec<NaiveDateTime> = (1..=ALTERNATIVE_PROBES)
                .map(|i| request.start + Duration::minutes(ALTERNATIVE_STEP_MINUTES * i))
                .filter(|alt| conflicts_in(&inner.events, *alt, *alt + length).is_empty())
                .take(MAX_ALTERNATIVES)
                .collect();
            tracing::info!(
                title = %request.title,
                conflicts = conflicts.len(),
                alternatives = alternatives.len(),
                "event rejected"
            );
            return Err(CollaboratorError(rejection_message(&conflicts, &alternatives)));
        }

        let record = EventRecord {
            id: uuid::Uuid::now_v7().to_string(),
            title: request.title.clone(),
            start: request.start,
            end: request.end(),
            timezone: request.timezone,
            location: request.location.clone(),
        };
        tracing::info!(id = %record.id, title = %record.title, start = %record.start, "event created");
        inner.events.push(record.clone());
        Ok(record)
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
