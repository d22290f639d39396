use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::answers::integrate_answer;
use super::completeness::{find_missing_fields, TemplateRequirement};
use super::enhancer::enhance_portfolio;
use super::extractor::extract_record;
use super::questions::generate_questions;
use crate::errors::AppError;
use crate::models::format::OutputFormat;
use crate::models::question::Question;
use crate::models::record::PortfolioRecord;
use crate::render::html::{render_page, PageHeader};
use crate::render::render_record;
use crate::state::AppState;
use crate::store::OutputStore;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParseTextRequest {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(rename = "rawText")]
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct ParseTextResponse {
    pub success: bool,
    pub parsed_data: PortfolioRecord,
    pub missing_fields: Vec<String>,
    pub template_variables: TemplateRequirement,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionsRequest {
    #[serde(default)]
    pub missing_fields: Vec<String>,
    #[serde(default)]
    pub context: Value,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub success: bool,
    pub questions: Vec<Question>,
    /// True only when there was nothing left to ask.
    pub is_complete: bool,
    /// The model call failed; an empty `questions` does not mean complete.
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerRequest {
    pub question: Question,
    pub answer: String,
    #[serde(default)]
    pub current_data: PortfolioRecord,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub success: bool,
    pub updated_data: PortfolioRecord,
}

fn default_enhance() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateGenerateRequest {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub data: PortfolioRecord,
    #[serde(default = "default_enhance")]
    pub enhance: bool,
}

#[derive(Debug, Serialize)]
pub struct TemplateGenerateResponse {
    pub success: bool,
    pub portfolio_id: Uuid,
    pub content: String,
    pub download_url: String,
    pub preview_url: String,
    pub message: String,
}

/// Inline template text wins; otherwise the named template is loaded from
/// the library (falling back to the default one).
async fn resolve_template(
    state: &AppState,
    inline: Option<String>,
    name: Option<&str>,
) -> Result<String, AppError> {
    if let Some(text) = inline.filter(|t| !t.trim().is_empty()) {
        return Ok(text);
    }
    match name.filter(|n| !n.trim().is_empty()) {
        Some(name) => Ok(state.templates.load(name, OutputFormat::Markdown).await?.text),
        None => Err(AppError::Validation(
            "Either `template` or `template_name` is required".to_string(),
        )),
    }
}

/// POST /api/parse-text
pub async fn handle_parse_text(
    State(state): State<AppState>,
    Json(req): Json<ParseTextRequest>,
) -> Result<Json<ParseTextResponse>, AppError> {
    if req.raw_text.trim().is_empty() {
        return Err(AppError::Validation("`rawText` must not be empty".to_string()));
    }
    let template = resolve_template(&state, req.template, req.template_name.as_deref()).await?;

    let required = TemplateRequirement::from_template(&template);
    let parsed_data = extract_record(state.llm.as_ref(), &req.raw_text, &required).await;
    let missing_fields = find_missing_fields(&parsed_data, &required);
    info!(
        "Parsed text: {} template variables, {} missing",
        required.names().len(),
        missing_fields.len()
    );

    Ok(Json(ParseTextResponse {
        success: true,
        parsed_data,
        missing_fields,
        template_variables: required,
    }))
}

/// POST /api/generate-questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Json(req): Json<QuestionsRequest>,
) -> Json<QuestionsResponse> {
    let outcome = generate_questions(state.llm.as_ref(), &req.missing_fields, &req.context).await;
    Json(QuestionsResponse {
        success: true,
        questions: outcome.questions,
        is_complete: req.missing_fields.is_empty(),
        degraded: outcome.degraded,
    })
}

/// POST /api/process-answer
pub async fn handle_process_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Json<AnswerResponse> {
    let updated_data =
        integrate_answer(state.llm.as_ref(), &req.question, &req.answer, req.current_data).await;
    Json(AnswerResponse {
        success: true,
        updated_data,
    })
}

/// POST /api/generate-from-template
///
/// Renders the record into the template, optionally enhances the prose, and
/// stores both `<id>.md` and `<id>.html`. A library template with its own
/// HTML variant renders the HTML file from the record; otherwise the
/// Markdown is wrapped in the standard page.
pub async fn handle_generate_from_template(
    State(state): State<AppState>,
    Json(req): Json<TemplateGenerateRequest>,
) -> Result<Json<TemplateGenerateResponse>, AppError> {
    let html_template = match (&req.template, req.template_name.as_deref()) {
        (None, Some(name)) => state.templates.find(name, OutputFormat::Html).await?,
        _ => None,
    };
    let template = resolve_template(&state, req.template, req.template_name.as_deref()).await?;

    let rendered = render_record(&template, &req.data);
    let content = if req.enhance {
        enhance_portfolio(state.llm.as_ref(), &rendered).await
    } else {
        rendered
    };

    let id = OutputStore::new_id();
    state
        .store
        .save(id, OutputFormat::Markdown, content.as_bytes())
        .await?;

    let page = match html_template {
        Some(html) => render_record(&html.text, &req.data),
        None => {
            let header = PageHeader {
                name: req.data.display_name(),
                title: req.data.display_title(),
                contacts: Vec::new(),
            };
            render_page(&header, &content)
        }
    };
    state.store.save(id, OutputFormat::Html, page.as_bytes()).await?;

    info!("Generated portfolio {id} from template");
    Ok(Json(TemplateGenerateResponse {
        success: true,
        portfolio_id: id,
        content,
        download_url: format!("/api/download/{id}"),
        preview_url: format!("/api/preview/{id}"),
        message: "Portfolio generated successfully".to_string(),
    }))
}
