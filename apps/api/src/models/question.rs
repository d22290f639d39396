use serde::{Deserialize, Serialize};

/// How the client should collect an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Select,
    Number,
}

/// A follow-up question about one missing record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub field: String,
    /// Why the field matters, the concrete ask, and an example answer.
    pub question: String,
    #[serde(rename = "type", default)]
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Question {
    /// Choices only make sense for `select`; a `select` without any is asked as free text.
    pub fn normalized(mut self) -> Self {
        let has_options = self.options.as_ref().is_some_and(|o| !o.is_empty());
        match self.input_type {
            InputType::Select if !has_options => {
                self.input_type = InputType::Text;
                self.options = None;
            }
            InputType::Select => {}
            _ => self.options = None,
        }
        self
    }
}
