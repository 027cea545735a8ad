//! Resolution error types.

use thiserror::Error;

/// What a resolver was trying to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Date,
    Time,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Date => "date",
            Self::Time => "time",
        })
    }
}

/// Errors produced by the resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NlpError {
    #[error("could not resolve a {kind} from '{input}'")]
    Unresolvable { kind: EntityKind, input: String },
}

impl NlpError {
    pub fn unresolvable(kind: EntityKind, input: impl Into<String>) -> Self {
        Self::Unresolvable {
            kind,
            input: input.into(),
        }
    }
}

/// Convenience alias for resolver results.
pub type NlpResult<T> = Result<T, NlpError>;
