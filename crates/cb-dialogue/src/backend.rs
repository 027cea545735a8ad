//! Calendar backend abstraction.

use async_trait::async_trait;
use cb_protocol::{AvailabilityReport, EventRecord, EventRequest};
use chrono::NaiveDateTime;
use chrono_tz::Tz;

/// Failure reported by a collaborator. The message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CollaboratorError(pub String);

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A calendar the dialogue engine can query and write to.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Events overlapping `[start, end)`, both local wall-clock times in `tz`.
    async fn check_availability(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        tz: Tz,
    ) -> Result<AvailabilityReport, CollaboratorError>;

    /// Create an event. Implementations may refuse conflicting slots.
    async fn create_event(&self, request: &EventRequest) -> Result<EventRecord, CollaboratorError>;

    /// Name of this backend (for logging).
    fn backend_name(&self) -> &str;
}
