//! Inbound request validation.
//!
//! A pure function of the raw JSON body and the registry. A rejected request
//! never reaches the upstream.

use serde_json::Value;

use crate::error::RelayError;
use crate::registry::ModelRegistry;
use crate::types::ChatRequest;

/// Maximum accepted message length, in characters (not bytes).
pub const MAX_MESSAGE_CHARS: usize = 10_000;

/// Validate a raw request body against the registry.
///
/// On success the message content is passed through unchanged; trimming is
/// only used to detect whitespace-only input.
pub fn chat_request(body: &Value, registry: &ModelRegistry) -> Result<ChatRequest, RelayError> {
    let message = match body.get("message") {
        Some(Value::String(s)) => s,
        None | Some(Value::Null) => {
            return Err(RelayError::InvalidInput("message is required".into()));
        }
        Some(_) => return Err(RelayError::InvalidInput("message must be a string".into())),
    };

    if message.trim().is_empty() {
        return Err(RelayError::InvalidInput("message must not be empty".into()));
    }

    let length = message.chars().count();
    if length > MAX_MESSAGE_CHARS {
        return Err(RelayError::MessageTooLong {
            length,
            limit: MAX_MESSAGE_CHARS,
        });
    }

    let model_key = match body.get("model") {
        Some(Value::String(s)) => s,
        _ => return Err(RelayError::UnknownModel("(not specified)".into())),
    };
    if !registry.contains(model_key) {
        return Err(RelayError::UnknownModel(model_key.clone()));
    }

    Ok(ChatRequest {
        message: message.clone(),
        model_key: model_key.clone(),
    })
}
