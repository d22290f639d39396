use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::best_effort;
use super::prompts::{fill, QUESTIONS_SYSTEM_TEMPLATE, QUESTIONS_USER};
use crate::llm_client::prompts::{with_instruction, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{complete_json, CompletionModel, CompletionRequest};
use crate::models::question::{InputType, Question};

const QUESTIONS_TEMPERATURE: f32 = 0.7;

/// Generated questions plus whether the model call degraded.
///
/// `degraded` separates "the model failed" from "nothing to ask": an empty
/// list with `degraded == false` only happens when nothing was missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestionOutcome {
    pub questions: Vec<Question>,
    pub degraded: bool,
}

impl QuestionOutcome {
    fn degraded() -> Self {
        Self {
            questions: Vec::new(),
            degraded: true,
        }
    }
}

/// Asks the model for follow-up questions about `missing` fields, in the
/// order the model returns them. An empty `missing` list returns at once
/// without calling the model.
pub async fn generate_questions(
    llm: &dyn CompletionModel,
    missing: &[String],
    context: &Value,
) -> QuestionOutcome {
    if missing.is_empty() {
        return QuestionOutcome::default();
    }

    let system = with_instruction(
        &fill(
            QUESTIONS_SYSTEM_TEMPLATE,
            &[
                ("missing_fields", &missing.join(", ")),
                ("context", &context.to_string()),
            ],
        ),
        JSON_ONLY_INSTRUCTION,
    );
    let request =
        CompletionRequest::new(&system, QUESTIONS_USER).temperature(QUESTIONS_TEMPERATURE);

    let response = match complete_json::<Value>(llm, request).await {
        Ok(value) => value,
        Err(e) => return best_effort("generate_questions", e, QuestionOutcome::degraded()),
    };
    let Some(items) = question_list(response) else {
        return best_effort(
            "generate_questions",
            "response is not a question list",
            QuestionOutcome::degraded(),
        );
    };

    let offered = items.len();
    let questions: Vec<Question> = items.into_iter().filter_map(parse_question).collect();

    if offered > 0 && questions.is_empty() {
        return best_effort(
            "generate_questions",
            format!("none of the {offered} returned questions were valid"),
            QuestionOutcome::degraded(),
        );
    }

    info!(
        "Generated {} questions for {} missing fields",
        questions.len(),
        missing.len()
    );
    QuestionOutcome {
        questions,
        degraded: false,
    }
}

/// The top-level array, or the array under `questions` when the model
/// wrapped it in an object.
fn question_list(response: Value) -> Option<Vec<Value>> {
    match response {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Builds a question from one model entry. Only a usable `field` and
/// `question` are required: an unrecognised `type` is asked as free text
/// and option lists keep their scalar entries as text.
fn parse_question(item: Value) -> Option<Question> {
    let mut entry = match item {
        Value::Object(entry) => entry,
        other => {
            warn!("Dropping question that is not an object: {other}");
            return None;
        }
    };
    let field = non_blank_text(entry.remove("field"));
    let question = non_blank_text(entry.remove("question"));
    let (Some(field), Some(question)) = (field, question) else {
        warn!("Dropping question with blank field or text");
        return None;
    };

    let input_type = match entry.remove("type") {
        None | Some(Value::Null) => InputType::default(),
        Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|_| {
            warn!("Question for {field} has unsupported type {raw}, asking as text");
            InputType::Text
        }),
    };
    let options = match entry.remove("options") {
        Some(Value::Array(items)) => Some(items.iter().filter_map(option_text).collect()),
        _ => None,
    };

    Some(
        Question {
            field,
            question,
            input_type,
            options,
        }
        .normalized(),
    )
}

fn non_blank_text(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn option_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
