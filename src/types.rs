//! Request-scoped value types.
//!
//! Everything here lives for one inbound request; there is no cache, session,
//! or cross-request state.

use std::fmt;

/// A validated inbound chat request.
///
/// Produced by [`crate::validate::chat_request`]; the message content is
/// carried through unchanged (trimming is only used to detect blank input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    /// Caller-facing model key, guaranteed present in the registry.
    pub model_key: String,
}

/// Successful dispatch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Reply text from the first choice of the serving model.
    pub reply: String,
    /// Key of the model that actually produced the reply. Equals the
    /// requested key unless a fallback served the request.
    pub served_by: String,
}

/// Normalized failure of a single upstream attempt.
///
/// `status` is the upstream HTTP status when the endpoint was reachable;
/// transport failures and timeouts carry `None`. The detail prefers the
/// structured message from the upstream error envelope when one is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub status: Option<u16>,
    pub detail: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "{} (status {code})", self.detail),
            None => f.write_str(&self.detail),
        }
    }
}
