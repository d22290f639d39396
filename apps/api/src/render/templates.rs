//! Template files on disk: `<dir>/<name>.<md|html>.mustache`, falling back
//! to `default.<ext>.mustache` when the named template does not exist.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::RenderError;
use crate::models::format::OutputFormat;

pub const DEFAULT_TEMPLATE: &str = "default";
const TEMPLATE_SUFFIX: &str = ".mustache";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateSummary {
    pub id: String,
    pub formats: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTemplate {
    /// The template actually used; `default` after a fallback.
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    dir: PathBuf,
}

/// PDF output is rendered from the HTML template.
fn template_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Markdown => "md",
        OutputFormat::Html | OutputFormat::Pdf => "html",
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl TemplateLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str, format: OutputFormat) -> PathBuf {
        self.dir.join(format!(
            "{name}.{}{TEMPLATE_SUFFIX}",
            template_extension(format)
        ))
    }

    /// Loads exactly `name` for `format`, without falling back.
    /// Names with path separators or other unexpected characters are treated as absent.
    pub async fn find(&self, name: &str, format: OutputFormat) -> Result<Option<LoadedTemplate>, RenderError> {
        if !is_valid_name(name) {
            return Ok(None);
        }
        let path = self.path_for(name, format);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!("Loaded template {}", path.display());
                Ok(Some(LoadedTemplate {
                    name: name.to_string(),
                    text,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RenderError::Io(e)),
        }
    }

    /// Loads `name` for `format`, falling back to the default template.
    pub async fn load(&self, name: &str, format: OutputFormat) -> Result<LoadedTemplate, RenderError> {
        if let Some(found) = self.find(name, format).await? {
            return Ok(found);
        }
        if name != DEFAULT_TEMPLATE {
            warn!(
                "Template '{}' ({}) not found, falling back to '{}'",
                name,
                format.as_str(),
                DEFAULT_TEMPLATE
            );
        }
        self.find(DEFAULT_TEMPLATE, format)
            .await?
            .ok_or_else(|| RenderError::TemplateNotFound(format!("{name} ({})", format.as_str())))
    }

    /// Every template in the directory with the formats it provides, sorted by id.
    pub async fn list(&self) -> Result<Vec<TemplateSummary>, RenderError> {
        let mut found: BTreeMap<String, Vec<&'static str>> = BTreeMap::new();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Templates directory does not exist: {}", self.dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(RenderError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(stem) = file_name
                .to_str()
                .and_then(|n| n.strip_suffix(TEMPLATE_SUFFIX))
            else {
                continue;
            };
            let Some((id, ext)) = stem.rsplit_once('.') else {
                continue;
            };
            let format = match ext {
                "md" => OutputFormat::Markdown,
                "html" => OutputFormat::Html,
                _ => continue,
            };
            if is_valid_name(id) {
                found.entry(id.to_string()).or_default().push(format.as_str());
            }
        }

        Ok(found
            .into_iter()
            .map(|(id, mut formats)| {
                formats.sort_unstable();
                TemplateSummary { id, formats }
            })
            .collect())
    }
}
