//! CalBot dialogue layer.
//!
//! Turns utterances into calendar actions: `engine` routes each turn and
//! fills booking slots across turns, talking to a `CalendarBackend` and a
//! `FallbackResponder` for anything the rules don't answer.

pub mod backend;
pub mod engine;
pub mod fallback;
pub mod mock;
pub mod slots;

pub use backend::{CalendarBackend, CollaboratorError};
pub use engine::{DialogueEngine, EMPTY_MESSAGE_REPLY};
pub use fallback::{FallbackConfig, FallbackResponder, OllamaFallback, ResponseKind, StaticFallback};
pub use mock::MockCalendar;
