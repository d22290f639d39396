// Shared prompt fragments.
// Each component that calls the model keeps its own prompts alongside it
// (see assistant::prompts). This file only holds cross-cutting pieces.

/// Appended to every system prompt that expects a JSON payload back.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Respond with valid JSON only. \
Do NOT include any text outside the JSON value. \
Do NOT include explanations or apologies.";

/// Keeps rewrites honest: wording may change, facts may not.
pub const FACT_PRESERVATION_INSTRUCTION: &str = "\
CRITICAL: Never change the facts or the structure of the original. \
Do not invent employers, dates, numbers, technologies or achievements. \
Only improve wording, emphasis and layout.";

/// Prompt used by the connectivity check.
pub const PING_PROMPT: &str = "Hello, just respond with 'API connected successfully'";

/// Joins a component's system prompt with a shared fragment.
pub fn with_instruction(system: &str, instruction: &str) -> String {
    format!("{}\n\n{}", system.trim_end(), instruction)
}
