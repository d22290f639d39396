pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::portfolio::handlers as portfolio;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/llm/health", get(health::llm_health_handler))
        // Reconciliation workflow
        .route("/api/parse-text", post(assistant::handle_parse_text))
        .route(
            "/api/generate-questions",
            post(assistant::handle_generate_questions),
        )
        .route("/api/process-answer", post(assistant::handle_process_answer))
        .route(
            "/api/generate-from-template",
            post(assistant::handle_generate_from_template),
        )
        // Structured generation
        .route("/api/analyze", post(portfolio::handle_analyze))
        .route("/api/generate", post(portfolio::handle_generate))
        .route("/api/templates", get(portfolio::handle_list_templates))
        .route("/api/templates/:name", get(portfolio::handle_get_template))
        // Stored output
        .route("/api/download/:id", get(portfolio::handle_download))
        .route("/api/preview/:id", get(portfolio::handle_preview))
        .with_state(state)
}
