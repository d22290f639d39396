//! HTML-to-PDF conversion through an external program.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;
use tracing::debug;

use super::RenderError;

/// Converts a complete HTML document to PDF bytes.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Bytes, RenderError>;
}

/// Runs `<program> [args...] <input.html> <output.pdf>` inside a scratch
/// directory, e.g. `wkhtmltopdf --quiet`.
#[derive(Debug, Clone)]
pub struct CommandPdfRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandPdfRenderer {
    /// Splits a command line such as `"wkhtmltopdf --quiet"` on whitespace.
    /// Returns `None` for a blank command line.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl PdfRenderer for CommandPdfRenderer {
    async fn render(&self, html: &str) -> Result<Bytes, RenderError> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("portfolio.html");
        let output = scratch.path().join("portfolio.pdf");
        tokio::fs::write(&input, html).await?;

        debug!("Running PDF renderer: {} {:?}", self.program, self.args);
        let result = Command::new(&self.program)
            .args(&self.args)
            .arg(&input)
            .arg(&output)
            .output()
            .await
            .map_err(|e| RenderError::Pdf(format!("failed to start '{}': {e}", self.program)))?;

        if !result.status.success() {
            return Err(RenderError::Pdf(format!(
                "'{}' exited with {}: {}",
                self.program,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        let pdf = tokio::fs::read(&output).await.map_err(|e| {
            RenderError::Pdf(format!("'{}' produced no output file: {e}", self.program))
        })?;
        if pdf.is_empty() {
            return Err(RenderError::Pdf(format!(
                "'{}' produced an empty file",
                self.program
            )));
        }
        Ok(Bytes::from(pdf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_parsing() {
        let renderer = CommandPdfRenderer::from_command_line("wkhtmltopdf  --quiet -s A4").unwrap();
        assert_eq!(renderer.program(), "wkhtmltopdf");
        assert_eq!(renderer.args, vec!["--quiet", "-s", "A4"]);
        assert!(CommandPdfRenderer::from_command_line("   ").is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_renderer_reads_program_output_file() {
        // `cp in out` stands in for a converter: the "PDF" is the HTML itself.
        let renderer = CommandPdfRenderer::from_command_line("cp").unwrap();
        let bytes = renderer.render("<html><body>hi</body></html>").await.unwrap();
        assert_eq!(&bytes[..], b"<html><body>hi</body></html>");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program_is_reported() {
        let renderer = CommandPdfRenderer::from_command_line("false").unwrap();
        let err = renderer.render("<html></html>").await.unwrap_err();
        assert!(matches!(err, RenderError::Pdf(msg) if msg.contains("exited with")));
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let renderer =
            CommandPdfRenderer::from_command_line("definitely-not-a-pdf-renderer-binary").unwrap();
        let err = renderer.render("<html></html>").await.unwrap_err();
        assert!(matches!(err, RenderError::Pdf(msg) if msg.contains("failed to start")));
    }
}
