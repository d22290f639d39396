// Prompt text for the reconciliation steps.
// Cross-cutting fragments come from llm_client::prompts.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Substitutes every `{name}` placeholder of `template` in a single pass.
/// Inserted values are never rescanned, so user text that happens to contain
/// `{answer}` stays literal. Names without a value are left as written.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder =
        PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));
    placeholder
        .replace_all(template, |caps: &Captures<'_>| {
            match values.iter().find(|(name, _)| *name == &caps[1]) {
                Some((_, value)) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Extraction instruction. `{required_fields}` is replaced with the
/// template's requirement list before sending.
pub const EXTRACTION_SYSTEM_TEMPLATE: &str = r#"You are an expert career consultant who turns free-form biographical text into a structured portfolio record.

Read the user's text and return ONE JSON object with this shape:
{
  "name": "full name",
  "title": "professional title",
  "email": "email address",
  "phone": "phone number",
  "github": "GitHub username or URL",
  "linkedin": "LinkedIn URL",
  "website": "personal website",
  "summary": "two or three sentence professional summary",
  "location": "city / country",
  "experiences": [
    {
      "company": "company name",
      "position": "job title",
      "startDate": "YYYY-MM",
      "endDate": "YYYY-MM or Present",
      "description": "what the role involved",
      "achievements": ["concrete achievement"],
      "technologies": ["technology"]
    }
  ],
  "projects": [
    {
      "name": "project name",
      "description": "what it does and why it matters",
      "technologies": ["technology"],
      "role": "the user's role",
      "results": ["measurable outcome"],
      "url": "link if mentioned"
    }
  ],
  "skills": [
    {"category": "skill area", "items": ["skill"]}
  ],
  "education": [
    {"institution": "school", "degree": "degree", "field": "major", "graduationDate": "YYYY"}
  ],
  "certifications": ["certification name"]
}

Rules:
- Only use facts that appear in the text. Never invent names, dates, employers or numbers.
- Use null for a scalar field the text does not mention and [] for a list with no entries.
- Extract technology and tool names exactly as written.
- The template being filled needs these fields, so look for them carefully: {required_fields}"#;

/// Question-generation instruction. `{missing_fields}` and `{context}` are
/// replaced before sending.
pub const QUESTIONS_SYSTEM_TEMPLATE: &str = r#"You are a career coach helping someone complete their portfolio.

Fields still missing: {missing_fields}
What we already know about the person: {context}

Write one follow-up question per missing field, most important field first.
Each question must explain briefly why the information matters, ask for it concretely, and give a short example answer.

Return a JSON array and nothing else:
[
  {
    "field": "missing field name",
    "question": "why it matters, the concrete ask, and an example",
    "type": "text | select | number",
    "options": ["only for select questions"]
  }
]"#;

pub const QUESTIONS_USER: &str = "Write the follow-up questions for the missing fields.";

/// Answer-integration instruction. `{field}`, `{question}` and `{answer}`
/// are replaced before sending.
pub const ANSWER_SYSTEM_TEMPLATE: &str = r#"You update a portfolio record with the user's answer to one follow-up question.

Question about field "{field}": {question}
User's answer: {answer}

Merge the answer into the record:
- Put the information in the "{field}" field, restructuring it to fit that field's shape (lists stay lists of objects).
- If the answer also mentions other fields, update those too.
- Keep every existing value that the answer does not change.
- Return the COMPLETE updated record as one JSON object."#;

/// User message for answer integration. `{current_data}` is replaced with
/// the record's JSON.
pub const ANSWER_USER_TEMPLATE: &str = "Current record:\n{current_data}\n\nReturn the complete updated record.";

pub const ENHANCE_SYSTEM: &str = "You are a professional portfolio editor. \
    Rewrite the portfolio below so it reads clearly and shows impact: \
    use strong action verbs, tighten wordy sentences and keep a consistent professional tone. \
    Keep the Markdown structure, headings and links exactly as they are. \
    Return only the rewritten portfolio.";

pub const ENHANCE_USER_TEMPLATE: &str = "Portfolio to improve:\n\n{content}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_substitutes_each_placeholder_once() {
        let filled = fill(
            "Q: {question} A: {answer} ({field})",
            &[
                ("field", "summary"),
                ("question", "What does {answer} mean?"),
                ("answer", "a {field} of my career"),
            ],
        );
        assert_eq!(
            filled,
            "Q: What does {answer} mean? A: a {field} of my career (summary)"
        );
    }

    #[test]
    fn test_fill_leaves_unknown_placeholders_and_json_alone() {
        let filled = fill(r#"{"type": "text"} {unknown} {name}"#, &[("name", "Alice")]);
        assert_eq!(filled, r#"{"type": "text"} {unknown} Alice"#);
    }
}
