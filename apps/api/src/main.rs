mod assistant;
mod config;
mod errors;
mod llm_client;
mod models;
mod portfolio;
mod render;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::render::pdf::CommandPdfRenderer;
use crate::render::templates::TemplateLibrary;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::OutputStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    )
    .context("Failed to build the completion API client")?;
    info!("LLM client initialized (model: {})", llm.model());

    let pdf = CommandPdfRenderer::from_command_line(&config.pdf_renderer)
        .context("PDF_RENDERER must name a program")?;
    info!("PDF renderer: {}", pdf.program());

    let store = OutputStore::open(&config.output_dir).await?;
    info!("Output directory: {}", store.dir().display());
    let templates = TemplateLibrary::new(&config.templates_dir);
    info!("Templates directory: {}", templates.dir().display());

    // Build app state
    let state = AppState {
        llm: Arc::new(llm),
        pdf: Arc::new(pdf),
        store,
        templates,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
