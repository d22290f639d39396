/// LLM Client: the single point of entry for all completion API calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// Components receive a `&dyn CompletionModel`; the service owns one
/// `Arc<dyn CompletionModel>` in `AppState` and tests swap in a scripted stub.
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod testing;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// True when the model answered with text that is not valid JSON,
    /// as opposed to the request failing or the answer being empty.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, LlmError::Parse(_))
    }
}

/// One completion exchange: a system instruction plus a single user message.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(system: &'a str, user: &'a str) -> Self {
        Self {
            system,
            user,
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A language-model completion backend.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Returns the text of the first completion choice.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError>;
}

/// Calls the model and deserializes the (possibly fenced) text response as JSON.
pub async fn complete_json<T: DeserializeOwned>(
    model: &dyn CompletionModel,
    request: CompletionRequest<'_>,
) -> Result<T, LlmError> {
    let text = model.complete(request).await?;
    let payload = extract_fenced_payload(&text);
    if payload.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    serde_json::from_str(payload).map_err(LlmError::Parse)
}

/// Returns the JSON payload of a model reply: the body of a fence wrapping
/// the whole reply, else the first fenced block inside surrounding prose,
/// else the trimmed text.
pub fn extract_fenced_payload(text: &str) -> &str {
    if let Some(body) = strip_outer_fence(text) {
        return body;
    }

    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid")
    });
    match fence.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// Strips a fence that wraps the whole reply: the opening ``` line with its
/// language tag and the ``` that ends the reply. Fences inside the body are
/// kept. `None` when the reply is not wrapped in a closed fence.
pub fn strip_outer_fence(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix("```")?;
    let body = match rest.split_once('\n') {
        Some((_tag, body)) => body,
        None => rest,
    };
    body.strip_suffix("```").map(str::trim)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client for any OpenAI-compatible endpoint.
/// Retries 429 and 5xx responses with exponential backoff.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the chat-completions API, returning the full response object.
    pub async fn call(&self, request: CompletionRequest<'_>) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl CompletionModel for LlmClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        response
            .text()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::testing::ScriptedModel;
    use super::*;

    #[test]
    fn test_fenced_payload_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_fenced_payload(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_fenced_payload_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_fenced_payload(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_fenced_payload_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(extract_fenced_payload(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_fenced_payload_surrounded_by_prose() {
        let input = "Here is the data:\n```json\n[1, 2]\n```\nLet me know if you need more.";
        assert_eq!(extract_fenced_payload(input), "[1, 2]");
    }

    #[test]
    fn test_fenced_payload_unterminated_fence_is_left_alone() {
        let input = "```json\n{\"key\": 1}";
        assert_eq!(extract_fenced_payload(input), input);
    }

    #[test]
    fn test_fenced_payload_keeps_inner_fences() {
        let input = "```json\n{\"summary\": \"```rust\\nfn main() {}\\n``` shipped\"}\n```";
        assert_eq!(
            extract_fenced_payload(input),
            "{\"summary\": \"```rust\\nfn main() {}\\n``` shipped\"}"
        );
    }

    #[test]
    fn test_strip_outer_fence() {
        let reply = "```markdown\n# Alice\n\n```rust\nfn main() {}\n```\n\nShipped it.\n```";
        assert_eq!(
            strip_outer_fence(reply),
            Some("# Alice\n\n```rust\nfn main() {}\n```\n\nShipped it.")
        );
        assert_eq!(strip_outer_fence("```\n```"), Some(""));
        assert_eq!(strip_outer_fence("# Alice\n```rust\nx\n```"), None);
        assert_eq!(strip_outer_fence("```json\n{\"key\": 1}"), None);
    }

    #[test]
    fn test_chat_response_text_reads_first_choice() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }))
        .unwrap();
        assert_eq!(response.text(), Some("first"));
    }

    #[test]
    fn test_parse_failure_classification() {
        let parse_err = serde_json::from_str::<Value>("nope").unwrap_err();
        assert!(LlmError::Parse(parse_err).is_parse_failure());
        assert!(!LlmError::EmptyContent.is_parse_failure());
        assert!(!LlmError::RateLimited { retries: 3 }.is_parse_failure());
    }

    #[tokio::test]
    async fn test_complete_json_unwraps_fence() {
        let model = ScriptedModel::new(["```json\n{\"name\": \"Alice\"}\n```"]);
        let value: Value = complete_json(&model, CompletionRequest::new("sys", "user"))
            .await
            .unwrap();
        assert_eq!(value, json!({"name": "Alice"}));
    }

    #[tokio::test]
    async fn test_complete_json_reports_parse_error() {
        let model = ScriptedModel::new(["not json"]);
        let err = complete_json::<Value>(&model, CompletionRequest::new("sys", "user"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[tokio::test]
    async fn test_complete_json_empty_fence_is_empty_content() {
        let model = ScriptedModel::new(["```json\n```"]);
        let err = complete_json::<Value>(&model, CompletionRequest::new("sys", "user"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
