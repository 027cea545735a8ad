//! Natural-language parsing for calendar requests.
//!
//! Everything here is rule-based and pure: each resolver is an ordered
//! table of pattern rules evaluated first-match-wins, and nothing reads the
//! system clock. Callers pass the reference instant explicitly.
//!
//! - `date`: "next week tuesday", "coming 30th", "june 30, 2026" → `NaiveDate`
//! - `time`: "2:30pm", "afternoon", "14:30" → `NaiveTime`
//! - `duration`: "half an hour", "90 mins" → minutes
//! - `intent`: availability / booking / casual
//! - `extract`: pulls all of the above, plus title and location, out of one utterance

pub mod date;
pub mod duration;
pub mod error;
pub mod extract;
pub mod intent;
pub mod time;

pub use error::{EntityKind, NlpError, NlpResult};
pub use extract::{ExtractionResult, extract};
pub use intent::{Intent, classify};
