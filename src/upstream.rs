//! Single-attempt upstream caller.
//!
//! One call, one normalized outcome: every transport fault, timeout, non-2xx
//! status, or unreadable body is folded into [`AttemptFailure`]. Nothing
//! panics or propagates a raw fault across this boundary.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::types::AttemptFailure;

/// One upstream chat attempt for an already-resolved model identifier.
///
/// Implemented by [`HttpUpstream`] in production and by scripted fakes in
/// dispatcher tests.
#[async_trait]
pub trait ChatUpstream: Send + Sync {
    /// Perform exactly one completion call for `model_id` and `message`.
    async fn complete(&self, model_id: &str, message: &str) -> Result<String, AttemptFailure>;
}

/// Body sent to `POST {base_url}/chat/completions`.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Successful upstream response, parsed leniently: a well-formed envelope
/// with absent choices or content collapses to an empty reply rather than a
/// parse error.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatCompletionChoice {
    #[serde(default)]
    message: ChoiceMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn reply_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
    }
}

/// Upstream caller backed by reqwest.
///
/// The per-attempt timeout is installed on the client itself, so every call
/// is bounded independently of its siblings in the fallback loop.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http_client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpUpstream {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ChatUpstream for HttpUpstream {
    async fn complete(&self, model_id: &str, message: &str) -> Result<String, AttemptFailure> {
        let body = ChatCompletionRequest {
            model: model_id,
            messages: vec![ChatCompletionMessage {
                role: "user",
                content: message,
            }],
        };

        debug!(model = %model_id, "sending chat completion request");
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AttemptFailure {
                status: None,
                detail: transport_detail(&e),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AttemptFailure {
            status: Some(status.as_u16()),
            detail: format!("failed to read upstream response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(AttemptFailure {
                status: Some(status.as_u16()),
                detail: upstream_error_detail(status.as_u16(), &text),
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| AttemptFailure {
                status: Some(status.as_u16()),
                detail: format!("unparseable upstream response: {e}"),
            })?;

        Ok(parsed.reply_text())
    }
}

fn transport_detail(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "upstream request timed out".to_string()
    } else if err.is_connect() {
        format!("failed to connect to upstream: {err}")
    } else {
        format!("upstream request failed: {err}")
    }
}

/// Extract the structured message from an OpenAI-style error envelope
/// (`{ "error": { "message": "..." } }`), falling back to a generic status
/// description when the body doesn't match.
fn upstream_error_detail(status: u16, body_text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body_text)
        .ok()
        .and_then(|json| {
            let message = json.get("error")?.get("message")?.as_str()?;
            Some(message.to_string())
        })
        .unwrap_or_else(|| format!("upstream returned status {status}"))
}
