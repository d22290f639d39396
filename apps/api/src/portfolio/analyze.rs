//! Rule-based readiness check for a partially filled structured request.
//! No model call: it only looks for the fields the fixed layout cannot do without.

use serde::Serialize;
use serde_json::{json, Value};

use crate::models::record::is_falsy;

const REQUIRED_USER_FIELDS: &[&str] = &["name", "title", "summary"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantAction {
    AskQuestion,
    PreviewMarkdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantResponse {
    pub action: AssistantAction,
    pub message: String,
    pub payload: Value,
    pub missing_fields: Vec<String>,
    pub stop: bool,
}

fn is_blank(value: Option<&Value>) -> bool {
    value.map_or(true, is_falsy)
}

/// Gaps in `data`, most fundamental first.
pub fn find_gaps(data: &Value) -> Vec<String> {
    let mut gaps = Vec::new();

    match data.get("user_info").filter(|v| !is_falsy(v)) {
        None => gaps.push("user_info".to_string()),
        Some(user_info) => {
            for field in REQUIRED_USER_FIELDS {
                if is_blank(user_info.get(field)) {
                    gaps.push(format!("user_info.{field}"));
                }
            }
        }
    }

    if is_blank(data.get("projects")) && is_blank(data.get("experiences")) {
        gaps.push("projects_or_experiences".to_string());
    }
    gaps
}

/// The question to ask for a gap and why it matters.
fn prompt_for(gap: &str) -> (String, String) {
    let (question, reason) = match gap {
        "user_info" | "user_info.name" => (
            "What is your name?",
            "It is shown at the top of the portfolio.",
        ),
        "user_info.title" => (
            "What is your role or job title?",
            "For example: Full Stack Developer, UI/UX Designer.",
        ),
        "user_info.summary" => (
            "Please write a short introduction.",
            "Two or three sentences on your core strengths and goals.",
        ),
        "projects_or_experiences" => (
            "Please add a project or a work experience.",
            "They are the core content of the portfolio.",
        ),
        other => {
            return (
                format!("Please provide {other}."),
                "It is needed to complete the portfolio.".to_string(),
            )
        }
    };
    (question.to_string(), reason.to_string())
}

pub fn analyze(data: &Value) -> AssistantResponse {
    let gaps = find_gaps(data);
    let Some(first) = gaps.first() else {
        return AssistantResponse {
            action: AssistantAction::PreviewMarkdown,
            message: "The portfolio has enough information. A preview can be generated.".to_string(),
            payload: json!({ "ready": true }),
            missing_fields: Vec::new(),
            stop: false,
        };
    };

    let (question, reason) = prompt_for(first);
    AssistantResponse {
        action: AssistantAction::AskQuestion,
        message: question.clone(),
        payload: json!({
            "question": question,
            "reason": reason,
            "field_name": first,
        }),
        missing_fields: gaps,
        stop: false,
    }
}
