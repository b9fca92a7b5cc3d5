//! Request dispatch and the fallback loop.
//!
//! State machine for one request:
//! `Attempting(requested) → Success | Attempting(fallback_i) → … → Success | Exhausted`.
//! Attempts are strictly sequential and each candidate model gets exactly one
//! attempt, so worst-case latency is bounded by
//! `(1 + untried fallbacks) × per-attempt timeout`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::RelayError;
use crate::registry::{FallbackOrder, ModelRegistry};
use crate::types::{AttemptFailure, ChatReply, ChatRequest};
use crate::upstream::ChatUpstream;

/// Dispatches validated requests to the upstream, walking the fallback order
/// when the requested model fails.
pub struct Dispatcher {
    registry: ModelRegistry,
    fallback: FallbackOrder,
    upstream: Arc<dyn ChatUpstream>,
}

impl Dispatcher {
    pub fn new(
        registry: ModelRegistry,
        fallback: FallbackOrder,
        upstream: Arc<dyn ChatUpstream>,
    ) -> Self {
        Self {
            registry,
            fallback,
            upstream,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn fallback(&self) -> &FallbackOrder {
        &self.fallback
    }

    /// Try the requested model, then each untried fallback in order; the
    /// first success wins and no further candidates are attempted.
    pub async fn dispatch(&self, request: &ChatRequest) -> Result<ChatReply, RelayError> {
        let requested = request.model_key.as_str();
        let mut attempts = 0usize;
        let mut last: Option<AttemptFailure> = None;

        for key in
            std::iter::once(requested).chain(self.fallback.candidates_after(requested))
        {
            // Requested keys are checked at validation, fallback keys at
            // construction, so every candidate resolves.
            let Some(model_id) = self.registry.resolve(key) else {
                continue;
            };

            attempts += 1;
            debug!(model = %key, attempt = attempts, "attempting model");
            match self.upstream.complete(model_id, &request.message).await {
                Ok(reply) => {
                    if key != requested {
                        info!(requested = %requested, served_by = %key, attempts, "fallback model served the request");
                    }
                    return Ok(ChatReply {
                        reply,
                        served_by: key.to_string(),
                    });
                }
                Err(failure) => {
                    warn!(model = %key, status = ?failure.status, detail = %failure.detail, "model attempt failed");
                    last = Some(failure);
                }
            }
        }

        Err(RelayError::Exhausted {
            attempts,
            last: last.unwrap_or_else(|| AttemptFailure {
                status: None,
                detail: "no candidate models were attempted".to_string(),
            }),
        })
    }
}
