//! Error types for the relay.
//!
//! Caller errors (`InvalidInput`, `MessageTooLong`, `UnknownModel`) surface
//! as 400 responses and never trigger an upstream call. `Exhausted` is the
//! only server-side error a caller can observe; individual attempt failures
//! stay inside the dispatch loop as [`AttemptFailure`].

use thiserror::Error;

use crate::types::AttemptFailure;

/// Top-level relay error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The message field is missing, not a string, or blank.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The message exceeds the character limit.
    #[error("Message too long: {length} characters (limit {limit})")]
    MessageTooLong { length: usize, limit: usize },

    /// The requested model key is not in the registry.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Every candidate model was attempted and all failed.
    #[error("All {attempts} model attempts failed: {last}")]
    Exhausted {
        attempts: usize,
        last: AttemptFailure,
    },

    /// The service cannot start with the given configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RelayError {
    /// HTTP status code this error maps to on the wire.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) | Self::MessageTooLong { .. } | Self::UnknownModel(_) => 400,
            Self::Exhausted { .. } | Self::Configuration(_) => 500,
        }
    }

    /// Whether the error was caused by the caller's input.
    pub fn is_caller_error(&self) -> bool {
        self.status_code() == 400
    }
}
