use serde::{Deserialize, Serialize};

/// Output formats a portfolio can be rendered to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Pdf,
}

impl OutputFormat {
    /// Lookup order used when serving a stored portfolio by id.
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Markdown, OutputFormat::Html, OutputFormat::Pdf];

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "text/markdown; charset=utf-8",
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Pdf => "application/pdf",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
        }
    }
}
