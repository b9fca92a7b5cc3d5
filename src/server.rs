//! HTTP surface: routing, handlers, and the wire-contract error mapping.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::dispatch::Dispatcher;
use crate::error::RelayError;
use crate::validate;

/// Shared, read-only application state. The dispatcher owns the registry,
/// fallback order, and upstream handle.
pub struct AppState {
    pub dispatcher: Dispatcher,
}

static INDEX_HTML: &str = include_str!("../assets/index.html");

/// Build the relay router with permissive CORS on every route.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/models", get(models))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
struct ChatBody {
    reply: String,
    used: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(&RelayError::InvalidInput(format!(
                "request body must be JSON: {rejection}"
            )));
        }
    };

    let request = match validate::chat_request(&body, state.dispatcher.registry()) {
        Ok(request) => request,
        Err(err) => return error_response(&err),
    };

    match state.dispatcher.dispatch(&request).await {
        Ok(reply) => (
            StatusCode::OK,
            Json(ChatBody {
                reply: reply.reply,
                used: reply.served_by,
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

async fn models(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "models": state.dispatcher.registry().keys(),
        "fallback": state.dispatcher.fallback().keys(),
    }))
}

fn error_response(err: &RelayError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match err {
        RelayError::Exhausted { attempts, last } => ErrorBody {
            error: format!("All {attempts} model attempts failed"),
            details: Some(last.to_string()),
        },
        other => ErrorBody {
            error: other.to_string(),
            details: None,
        },
    };
    (status, Json(body)).into_response()
}
