#[cfg(test)]
mod tests;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::engine::RetrievalEngine;

/// Shared application state passed to route handlers. The engine is
/// immutable after startup, so handlers only ever read through the `Arc`.
#[derive(Clone)]
struct AppState {
    engine: Arc<RetrievalEngine>,
    excerpt_chars: usize,
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct AskReply {
    reply: String,
}

#[derive(Serialize)]
struct HealthReply {
    name: &'static str,
    version: &'static str,
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Answer a single question. A below-threshold match is a normal reply
/// carrying the fixed not-found message, never an HTTP error.
async fn handle_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskReply>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let reply = state.engine.answer(message, state.excerpt_chars).into_reply();
    Ok(Json(AskReply { reply }))
}

async fn handle_health() -> Json<HealthReply> {
    Json(HealthReply {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router around an already-built engine.
fn build_router(engine: Arc<RetrievalEngine>, excerpt_chars: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        engine,
        excerpt_chars,
    };

    Router::new()
        .route("/ask", post(handle_ask))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Serve the question endpoint until the process is terminated. The
/// engine must be fully built before this is called; every request is a
/// pure read over it.
#[inline]
pub async fn run_server(
    engine: Arc<RetrievalEngine>,
    bind: &str,
    excerpt_chars: usize,
) -> Result<()> {
    let app = build_router(engine, excerpt_chars);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind server address: {}", bind))?;

    info!("Server listening on http://{}", bind);
    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
