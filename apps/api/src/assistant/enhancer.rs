use tracing::info;

use super::best_effort;
use super::prompts::{ENHANCE_SYSTEM, ENHANCE_USER_TEMPLATE};
use crate::llm_client::prompts::{with_instruction, FACT_PRESERVATION_INSTRUCTION};
use crate::llm_client::{strip_outer_fence, CompletionModel, CompletionRequest};

const ENHANCE_TEMPERATURE: f32 = 0.7;

/// Asks the model to rewrite rendered Markdown for clarity and impact.
/// Returns `content` untouched when the call fails or comes back blank.
pub async fn enhance_portfolio(llm: &dyn CompletionModel, content: &str) -> String {
    let system = with_instruction(ENHANCE_SYSTEM, FACT_PRESERVATION_INSTRUCTION);
    let user = ENHANCE_USER_TEMPLATE.replace("{content}", content);
    let request = CompletionRequest::new(&system, &user).temperature(ENHANCE_TEMPERATURE);

    let text = match llm.complete(request).await {
        Ok(text) => text,
        Err(e) => return best_effort("enhance_portfolio", e, content.to_string()),
    };

    // A reply that is entirely one ```markdown block gets unwrapped.
    let rewritten = strip_outer_fence(&text).unwrap_or_else(|| text.trim());
    if rewritten.is_empty() {
        return best_effort("enhance_portfolio", "blank rewrite", content.to_string());
    }

    info!(
        "Enhanced portfolio ({} -> {} chars)",
        content.len(),
        rewritten.len()
    );
    rewritten.to_string()
}
