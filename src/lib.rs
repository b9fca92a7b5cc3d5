//! yumcha-relay
//!
//! An HTTP relay that accepts a chat message and a model selector, forwards
//! the request to an OpenAI-compatible LLM API, and returns the generated
//! reply. When the requested model's upstream call fails, the relay walks a
//! fixed fallback order and tries each untried alternate in sequence until
//! one succeeds or every candidate has failed.
#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod server;
pub mod types;
pub mod upstream;
pub mod validate;

pub use config::RelayConfig;
pub use dispatch::Dispatcher;
pub use error::RelayError;
pub use registry::{FallbackOrder, ModelRegistry};
pub use types::{AttemptFailure, ChatReply, ChatRequest};
pub use upstream::{ChatUpstream, HttpUpstream};
