use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::llm_client::prompts::PING_PROMPT;
use crate::llm_client::CompletionRequest;
use crate::state::AppState;

const SERVICE: &str = "portfolio-api";

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Portfolio Generator API",
        "service": SERVICE,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": SERVICE
    }))
}

/// GET /api/llm/health
/// Sends one tiny completion. Always 200; the outcome is in `status`.
pub async fn llm_health_handler(State(state): State<AppState>) -> Json<Value> {
    let request = CompletionRequest::new("You are a connectivity check.", PING_PROMPT)
        .temperature(0.0)
        .max_tokens(20);
    match state.llm.complete(request).await {
        Ok(reply) => Json(json!({
            "status": "success",
            "message": "Completion API reachable",
            "response": reply.trim()
        })),
        Err(e) => {
            warn!("LLM health check failed: {e}");
            Json(json!({
                "status": "error",
                "message": format!("Completion API error: {e}")
            }))
        }
    }
}
