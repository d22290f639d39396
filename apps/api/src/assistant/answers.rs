use serde_json::Value;
use tracing::{debug, info, warn};

use super::best_effort;
use super::prompts::{fill, ANSWER_SYSTEM_TEMPLATE, ANSWER_USER_TEMPLATE};
use crate::llm_client::prompts::{with_instruction, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{complete_json, CompletionModel, CompletionRequest};
use crate::models::question::Question;
use crate::models::record::PortfolioRecord;

const ANSWER_TEMPERATURE: f32 = 0.1;
const ANSWER_MAX_TOKENS: u32 = 2000;

/// Merges one answer into the record by asking the model for the complete
/// updated record.
///
/// Never fails. When the model answers with something that is not JSON, the
/// raw answer is written straight into `question.field` (if the record has
/// such a field). Any other failure returns `current` unchanged.
pub async fn integrate_answer(
    llm: &dyn CompletionModel,
    question: &Question,
    answer: &str,
    current: PortfolioRecord,
) -> PortfolioRecord {
    let current_json = match serde_json::to_string_pretty(&current) {
        Ok(json) => json,
        Err(e) => return best_effort("integrate_answer", e, current),
    };
    let system = with_instruction(
        &fill(
            ANSWER_SYSTEM_TEMPLATE,
            &[
                ("field", &question.field),
                ("question", &question.question),
                ("answer", answer),
            ],
        ),
        JSON_ONLY_INSTRUCTION,
    );
    let user = ANSWER_USER_TEMPLATE.replace("{current_data}", &current_json);
    let request = CompletionRequest::new(&system, &user)
        .temperature(ANSWER_TEMPERATURE)
        .max_tokens(ANSWER_MAX_TOKENS);

    let value: Value = match complete_json(llm, request).await {
        Ok(value) => value,
        Err(e) if e.is_parse_failure() => {
            warn!("Answer integration returned non-JSON ({e}), assigning answer directly");
            return assign_directly(current, &question.field, answer);
        }
        Err(e) => return best_effort("integrate_answer", e, current),
    };

    match PortfolioRecord::from_model_output(value) {
        Ok((updated, dropped)) => {
            if !dropped.is_empty() {
                debug!("Discarded unknown keys from updated record: {}", dropped.join(", "));
            }
            info!("Integrated answer for field '{}'", question.field);
            updated
        }
        Err(e) => best_effort("integrate_answer", e, current),
    }
}

fn assign_directly(mut record: PortfolioRecord, field: &str, answer: &str) -> PortfolioRecord {
    if !record.assign_text(field, answer) {
        warn!("Field '{field}' does not exist on the record, leaving it unchanged");
    }
    record
}
