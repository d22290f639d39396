use serde::Serialize;
use tracing::debug;

use crate::models::record::{is_falsy, PortfolioRecord};
use crate::render::template::{scan_placeholders, Template};

/// The field names a template reads, in first-use order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateRequirement(Vec<String>);

impl TemplateRequirement {
    /// Top-level variables and section names of `template`. Templates that
    /// do not compile are scanned for plain `{{word}}` placeholders instead.
    pub fn from_template(template: &str) -> Self {
        match Template::compile(template) {
            Ok(compiled) => Self(compiled.variables().to_vec()),
            Err(e) => {
                debug!("Template did not compile ({e}), scanning placeholders instead");
                Self(scan_placeholders(template))
            }
        }
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TemplateRequirement {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in iter {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Self(names)
    }
}

/// Required fields the record does not satisfy, in requirement order.
///
/// A field is missing when the record has no such field or its value is
/// falsy: unset, empty text, zero, an empty list or an empty object.
pub fn find_missing_fields(record: &PortfolioRecord, required: &TemplateRequirement) -> Vec<String> {
    let values = record.to_map();
    required
        .names()
        .iter()
        .filter(|name| values.get(name.as_str()).map_or(true, is_falsy))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> PortfolioRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_requirement_from_simple_template() {
        let req = TemplateRequirement::from_template("Hello {{name}}, you are a {{title}}. Bye {{name}}");
        assert_eq!(req.names(), ["name", "title"]);
    }

    #[test]
    fn test_requirement_uses_section_names_not_item_fields() {
        let req = TemplateRequirement::from_template(
            "# {{name}}\n{{#experiences}}\n- {{company}}\n{{/experiences}}\n{{^projects}}none{{/projects}}",
        );
        assert_eq!(req.names(), ["name", "experiences", "projects"]);
    }

    #[test]
    fn test_requirement_from_unparsable_template_scans_placeholders() {
        let req = TemplateRequirement::from_template("{{name}} {{#skills}} unterminated {{email}}");
        assert_eq!(req.names(), ["name", "email"]);
    }

    #[test]
    fn test_requirement_collects_duplicates_once() {
        let req: TemplateRequirement = ["email", "name", "email"].into_iter().collect();
        assert_eq!(req.names(), ["email", "name"]);
    }

    #[test]
    fn test_populated_fields_are_not_missing() {
        let rec = record(json!({"name": "Alice", "title": "backend engineer"}));
        let req = TemplateRequirement::from_template("Hello {{name}}, you are a {{title}}");
        assert!(find_missing_fields(&rec, &req).is_empty());
    }

    #[test]
    fn test_empty_list_counts_as_missing() {
        let rec = record(json!({"name": "Alice", "experiences": []}));
        let req: TemplateRequirement = ["name", "experiences"].into_iter().collect();
        assert_eq!(find_missing_fields(&rec, &req), vec!["experiences".to_string()]);
    }

    #[test]
    fn test_unknown_and_blank_fields_are_missing() {
        let rec = record(json!({"name": "", "email": "a@b.c"}));
        let req: TemplateRequirement = ["favourite_colour", "name", "email", "phone"].into_iter().collect();
        assert_eq!(
            find_missing_fields(&rec, &req),
            vec![
                "favourite_colour".to_string(),
                "name".to_string(),
                "phone".to_string()
            ]
        );
    }

    #[test]
    fn test_zero_and_false_scalars_are_missing() {
        let rec = record(json!({"name": "Alice", "phone": 0, "title": false}));
        let req = TemplateRequirement::from_template("{{name}} {{phone}} {{title}}");
        assert_eq!(find_missing_fields(&rec, &req), ["phone", "title"]);
    }

    #[test]
    fn test_missing_field_order_follows_requirement() {
        let rec = PortfolioRecord::default();
        let req: TemplateRequirement = ["summary", "name", "skills"].into_iter().collect();
        assert_eq!(find_missing_fields(&rec, &req), ["summary", "name", "skills"]);
    }

    #[test]
    fn test_missing_fields_is_idempotent() {
        let rec = record(json!({"name": "Alice", "projects": [{"name": "X"}]}));
        let req = TemplateRequirement::from_template(
            "{{name}} {{title}} {{#projects}}{{name}}{{/projects}} {{#skills}}{{.}}{{/skills}}",
        );
        let first = find_missing_fields(&rec, &req);
        let second = find_missing_fields(&rec, &req);
        assert_eq!(first, second);
        assert_eq!(first, ["title", "skills"]);
    }
}
