use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::retain_known_keys;

/// Every field name a `PortfolioRecord` understands. Model output keys outside
/// this set are discarded before decoding.
pub const KNOWN_FIELDS: &[&str] = &[
    "name",
    "title",
    "email",
    "phone",
    "github",
    "githubUrl",
    "linkedin",
    "website",
    "behance",
    "summary",
    "location",
    "role",
    "tools",
    "experiences",
    "projects",
    "skills",
    "education",
    "certifications",
    "languages",
];

/// The structured content of one user's portfolio.
///
/// Scalars are optional strings. The six list fields are always present
/// (`null` decodes to an empty list), so "missing" for a list means empty.
/// List elements are loosely-typed JSON mappings, e.g. an experience holding
/// `company`, `position`, `startDate`, `endDate`, `description`,
/// `achievements` and `technologies`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortfolioRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub github: Option<String>,
    #[serde(rename = "githubUrl", default, deserialize_with = "lenient_text")]
    pub github_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub behance: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tools: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub experiences: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub projects: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub education: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub certifications: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub languages: Vec<Value>,
}

impl PortfolioRecord {
    /// Decodes a model-produced JSON object, silently dropping keys outside
    /// `KNOWN_FIELDS`. Returns the record and the names that were dropped.
    pub fn from_model_output(mut value: Value) -> Result<(Self, Vec<String>), serde_json::Error> {
        if !value.is_object() {
            return Err(de::Error::custom("expected a JSON object for the portfolio record"));
        }
        let dropped = retain_known_keys(&mut value, KNOWN_FIELDS);
        let record = serde_json::from_value(value)?;
        Ok((record, dropped))
    }

    /// The record as a JSON object keyed by wire field names.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Overwrites one field with literal text. List fields become a
    /// one-element list holding the text. Returns false for unknown names.
    pub fn assign_text(&mut self, field: &str, text: &str) -> bool {
        let text = text.to_string();
        let slot = match field {
            "name" => &mut self.name,
            "title" => &mut self.title,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "github" => &mut self.github,
            "githubUrl" => &mut self.github_url,
            "linkedin" => &mut self.linkedin,
            "website" => &mut self.website,
            "behance" => &mut self.behance,
            "summary" => &mut self.summary,
            "location" => &mut self.location,
            "role" => &mut self.role,
            "tools" => &mut self.tools,
            _ => {
                let list = match field {
                    "experiences" => &mut self.experiences,
                    "projects" => &mut self.projects,
                    "skills" => &mut self.skills,
                    "education" => &mut self.education,
                    "certifications" => &mut self.certifications,
                    "languages" => &mut self.languages,
                    _ => return false,
                };
                *list = vec![Value::String(text)];
                return true;
            }
        };
        *slot = Some(text);
        true
    }

    /// Display name for page titles.
    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or("Portfolio")
    }

    /// Display title for page headers.
    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or("Professional")
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Truthiness used by the completeness check and template sections:
/// null, false, "", 0, [] and {} are all falsy.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Accepts any JSON scalar for a text field; models routinely emit phone
/// numbers as numbers and tool lists as arrays. Falsy values stay unset so
/// a `0` or `false` placeholder still counts as missing.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if is_falsy(&value) {
        return Ok(None);
    }
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    })
}

/// `null` becomes an empty list, a lone value becomes a one-element list.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    })
}
