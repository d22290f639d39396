// Free-text-to-record reconciliation: extraction, completeness, follow-up
// questions, answer integration and prose enhancement.
// All model calls go through `llm_client::CompletionModel`.

pub mod answers;
pub mod completeness;
pub mod enhancer;
pub mod extractor;
pub mod handlers;
pub mod prompts;
pub mod questions;

use std::fmt::Display;

use tracing::warn;

/// Best-effort degradation: an AI-calling step that fails hands back
/// `fallback` instead of an error. The request carries on with empty or
/// unchanged data and the failure is only visible in the logs.
pub fn best_effort<T>(operation: &'static str, error: impl Display, fallback: T) -> T {
    warn!(operation, "AI step degraded, continuing with fallback: {error}");
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_effort_returns_fallback() {
        let value = best_effort("extract", "upstream timed out", vec![1, 2]);
        assert_eq!(value, vec![1, 2]);
    }
}
