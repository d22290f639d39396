use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::analyze::{analyze, AssistantResponse};
use crate::errors::AppError;
use crate::models::format::OutputFormat;
use crate::models::portfolio::PortfolioRequest;
use crate::render::markdown::{build_html, build_markdown};
use crate::render::templates::TemplateSummary;
use crate::state::AppState;
use crate::store::OutputStore;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub portfolio_id: Uuid,
    pub format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateQuery {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    /// The template actually served; `default` after a fallback.
    pub name: String,
    pub format: OutputFormat,
    pub content: String,
}

/// POST /api/analyze
pub async fn handle_analyze(Json(data): Json<Value>) -> Json<AssistantResponse> {
    Json(analyze(&data))
}

/// POST /api/generate
///
/// Fixed-layout rendering of a structured request into one stored file.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<PortfolioRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    req.validate().map_err(AppError::UnprocessableEntity)?;

    let id = OutputStore::new_id();
    let download_url = format!("/api/download/{id}");

    let response = match req.format {
        OutputFormat::Markdown => {
            let content = build_markdown(&req);
            state.store.save(id, req.format, content.as_bytes()).await?;
            GenerateResponse {
                portfolio_id: id,
                format: req.format,
                content: Some(content),
                download_url,
                preview_url: None,
                message: "Markdown portfolio generated".to_string(),
            }
        }
        OutputFormat::Html => {
            let page = build_html(&req);
            state.store.save(id, req.format, page.as_bytes()).await?;
            GenerateResponse {
                portfolio_id: id,
                format: req.format,
                content: None,
                download_url,
                preview_url: Some(format!("/api/preview/{id}")),
                message: "HTML portfolio generated".to_string(),
            }
        }
        OutputFormat::Pdf => {
            let pdf = state.pdf.render(&build_html(&req)).await?;
            state.store.save(id, req.format, &pdf).await?;
            GenerateResponse {
                portfolio_id: id,
                format: req.format,
                content: None,
                download_url,
                preview_url: None,
                message: "PDF portfolio generated".to_string(),
            }
        }
    };

    info!(
        "Generated {} portfolio {id} for {} (layout {}, theme {})",
        req.format.as_str(),
        req.user_info.name,
        req.template,
        req.theme.as_deref().unwrap_or("none")
    );
    Ok(Json(response))
}

/// GET /api/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateListResponse>, AppError> {
    let templates = state.templates.list().await?;
    Ok(Json(TemplateListResponse { templates }))
}

/// GET /api/templates/:name?format=markdown|html
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<TemplateResponse>, AppError> {
    let loaded = state.templates.load(&name, query.format).await?;
    Ok(Json(TemplateResponse {
        name: loaded.name,
        format: query.format,
        content: loaded.text,
    }))
}

/// GET /api/download/:id
pub async fn handle_download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let stored = state
        .store
        .find(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {id} not found")))?;

    let disposition = format!("attachment; filename=\"{}\"", stored.download_name());
    Ok((
        [
            (header::CONTENT_TYPE, stored.format.media_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        stored.bytes,
    )
        .into_response())
}

/// GET /api/preview/:id
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let stored = state
        .store
        .read(&id, OutputFormat::Html)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Preview {id} not found")))?;
    Ok(Html(String::from_utf8_lossy(&stored.bytes).into_owned()))
}
