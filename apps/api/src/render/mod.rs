// Rendering: logic-less template substitution, the fixed Markdown layout,
// Markdown-to-HTML page shells, template files and external PDF conversion.

pub mod html;
pub mod markdown;
pub mod pdf;
pub mod template;
pub mod templates;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::record::PortfolioRecord;
use template::{Template, TemplateError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Substitutes a record into free-form template text.
///
/// Unset fields render as empty text. A template that does not compile, or
/// that uses a list as plain text, is returned as-is; rendering never fails.
pub fn render_record(template: &str, record: &PortfolioRecord) -> String {
    let data = Value::Object(record.to_map());
    match Template::compile(template).and_then(|t| t.render(&data)) {
        Ok(rendered) => rendered,
        Err(e) => {
            warn!("Template could not be rendered, returning it unrendered: {e}");
            template.to_string()
        }
    }
}
