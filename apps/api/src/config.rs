use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub port: u16,
    pub rust_log: String,
    /// Directory holding `<name>.<md|html>.mustache` template files.
    pub templates_dir: PathBuf,
    /// Ephemeral output directory for rendered portfolios. Never cleaned by the service.
    pub output_dir: PathBuf,
    /// HTML-to-PDF converter program, invoked as `<program> <in.html> <out.pdf>`.
    pub pdf_renderer: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_base_url: or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            openai_model: or_default("OPENAI_MODEL", DEFAULT_MODEL),
            port: or_default("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
            templates_dir: PathBuf::from(or_default("TEMPLATES_DIR", "templates")),
            output_dir: PathBuf::from(or_default("OUTPUT_DIR", "temp")),
            pdf_renderer: or_default("PDF_RENDERER", "wkhtmltopdf"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.openai_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.openai_model, DEFAULT_MODEL);
        assert_eq!(config.port, 8000);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.output_dir, PathBuf::from("temp"));
        assert_eq!(config.pdf_renderer, "wkhtmltopdf");
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("PORT", "9090"),
            ("OUTPUT_DIR", "/var/tmp/portfolios"),
        ]))
        .unwrap();
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.port, 9090);
        assert_eq!(config.output_dir, PathBuf::from("/var/tmp/portfolios"));
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_an_error() {
        assert!(Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
