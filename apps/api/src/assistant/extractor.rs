use serde_json::Value;
use tracing::{debug, info};

use super::best_effort;
use super::completeness::TemplateRequirement;
use super::prompts::EXTRACTION_SYSTEM_TEMPLATE;
use crate::llm_client::prompts::{with_instruction, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{complete_json, CompletionModel, CompletionRequest};
use crate::models::record::{is_falsy, PortfolioRecord};

const EXTRACTION_TEMPERATURE: f32 = 0.3;

fn build_extraction_system(required: &TemplateRequirement) -> String {
    let required_fields = if required.is_empty() {
        "(none listed)".to_string()
    } else {
        required.names().join(", ")
    };
    with_instruction(
        &EXTRACTION_SYSTEM_TEMPLATE.replace("{required_fields}", &required_fields),
        JSON_ONLY_INSTRUCTION,
    )
}

/// Extracts a record from free text in one completion request.
///
/// Best-effort: a failed call, unparsable output or a payload that is not a
/// record object all produce an empty record. Keys outside the known field
/// set are dropped.
pub async fn extract_record(
    llm: &dyn CompletionModel,
    raw_text: &str,
    required: &TemplateRequirement,
) -> PortfolioRecord {
    let system = build_extraction_system(required);
    let user = format!("Extract the portfolio information from this text:\n\n{raw_text}");
    let request = CompletionRequest::new(&system, &user).temperature(EXTRACTION_TEMPERATURE);

    let value: Value = match complete_json(llm, request).await {
        Ok(value) => value,
        Err(e) => return best_effort("extract_record", e, PortfolioRecord::default()),
    };

    match PortfolioRecord::from_model_output(value) {
        Ok((record, dropped)) => {
            if !dropped.is_empty() {
                debug!("Discarded unknown extracted keys: {}", dropped.join(", "));
            }
            info!("Extracted record with {} populated fields", populated_count(&record));
            record
        }
        Err(e) => best_effort("extract_record", e, PortfolioRecord::default()),
    }
}

fn populated_count(record: &PortfolioRecord) -> usize {
    record
        .to_map()
        .values()
        .filter(|v| !is_falsy(v))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::completeness::find_missing_fields;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmError;

    #[tokio::test]
    async fn test_extract_then_check_completeness() {
        let model = ScriptedModel::new([
            "```json\n{\"name\": \"Alice\", \"title\": \"backend engineer\", \"email\": null}\n```",
        ]);
        let req = TemplateRequirement::from_template("Hello {{name}}, you are a {{title}}");

        let record = extract_record(&model, "My name is Alice and I am a backend engineer", &req).await;

        assert_eq!(record.name.as_deref(), Some("Alice"));
        assert_eq!(record.title.as_deref(), Some("backend engineer"));
        assert!(find_missing_fields(&record, &req).is_empty());
    }

    #[tokio::test]
    async fn test_prompt_carries_required_fields_and_text() {
        let model = ScriptedModel::new(["{}"]);
        let req: TemplateRequirement = ["name", "projects"].into_iter().collect();
        extract_record(&model, "I built a compiler.", &req).await;

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.contains("name, projects"));
        assert!(calls[0].system.contains(JSON_ONLY_INSTRUCTION));
        assert!(calls[0].user.contains("I built a compiler."));
        assert_eq!(calls[0].temperature, EXTRACTION_TEMPERATURE);
    }

    #[tokio::test]
    async fn test_unknown_keys_are_dropped() {
        let model = ScriptedModel::new([r#"{"name": "Bob", "hobby": "chess", "age": 41}"#]);
        let record = extract_record(&model, "text", &TemplateRequirement::default()).await;
        assert_eq!(
            record,
            PortfolioRecord {
                name: Some("Bob".to_string()),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_output_yields_empty_record() {
        let model = ScriptedModel::new(["Sorry, I cannot help with that."]);
        let record = extract_record(&model, "text", &TemplateRequirement::default()).await;
        assert_eq!(record, PortfolioRecord::default());
    }

    #[tokio::test]
    async fn test_non_object_output_yields_empty_record() {
        let model = ScriptedModel::new(["[\"Alice\"]"]);
        let record = extract_record(&model, "text", &TemplateRequirement::default()).await;
        assert_eq!(record, PortfolioRecord::default());
    }

    #[tokio::test]
    async fn test_upstream_failure_yields_empty_record() {
        let model = ScriptedModel::with_replies([Err(LlmError::RateLimited { retries: 3 })]);
        let record = extract_record(&model, "text", &TemplateRequirement::default()).await;
        assert_eq!(record, PortfolioRecord::default());
    }

    #[tokio::test]
    async fn test_unpopulated_fields_are_reported_missing() {
        let model = ScriptedModel::new([
            r#"{"name": "Alice", "summary": "", "experiences": [], "skills": [{"category": "Lang", "items": ["Rust"]}]}"#,
        ]);
        let req: TemplateRequirement = ["name", "summary", "experiences", "skills", "email"]
            .into_iter()
            .collect();
        let record = extract_record(&model, "text", &req).await;
        assert_eq!(find_missing_fields(&record, &req), ["summary", "experiences", "email"]);
    }

    #[tokio::test]
    async fn test_zero_and_false_placeholders_are_reported_missing() {
        let model = ScriptedModel::new([r#"{"name": "Alice", "phone": 0, "title": false}"#]);
        let req: TemplateRequirement = ["name", "phone", "title"].into_iter().collect();
        let record = extract_record(&model, "Alice", &req).await;
        assert_eq!(record.phone, None);
        assert_eq!(find_missing_fields(&record, &req), ["phone", "title"]);
    }
}
