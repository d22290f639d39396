use std::sync::Arc;

use crate::llm_client::CompletionModel;
use crate::render::pdf::PdfRenderer;
use crate::render::templates::TemplateLibrary;
use crate::store::OutputStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one completion backend. `LlmClient` in production, a scripted stub in tests.
    pub llm: Arc<dyn CompletionModel>,
    /// HTML-to-PDF converter. Default: `CommandPdfRenderer` running `PDF_RENDERER`.
    pub pdf: Arc<dyn PdfRenderer>,
    pub store: OutputStore,
    pub templates: TemplateLibrary,
}
