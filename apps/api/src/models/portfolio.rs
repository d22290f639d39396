//! Structured portfolio input for the fixed Markdown rendering path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::format::OutputFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserInfo {
    pub name: String,
    pub title: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
    pub summary: String,
    pub location: Option<String>,
}

fn present() -> String {
    "Present".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub start_date: String,
    #[serde(default = "present")]
    pub end_date: String,
    pub description: String,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Vec<String>,
    pub highlights: Vec<String>,
    pub image_url: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub gpa: Option<f64>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Skill {
    pub category: String,
    pub items: Vec<String>,
    /// 1 (familiar) to 5 (expert).
    pub proficiency: Option<u8>,
}

fn default_layout() -> String {
    "modern".to_string()
}

fn default_theme() -> Option<String> {
    Some("light".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortfolioRequest {
    pub user_info: UserInfo,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub certifications: Vec<String>,
    /// e.g. `{"language": "Korean", "level": "Native"}`
    #[serde(default)]
    pub languages: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    pub format: OutputFormat,
    /// Layout the client picked. The fixed renderer does not branch on it.
    #[serde(default = "default_layout")]
    pub template: String,
    #[serde(default = "default_theme")]
    pub theme: Option<String>,
}

impl PortfolioRequest {
    /// Checks the constraints serde cannot express. Returns the first violation.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("user_info.name", &self.user_info.name),
            ("user_info.title", &self.user_info.title),
            ("user_info.summary", &self.user_info.summary),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("{field} cannot be empty"));
        }

        for skill in &self.skills {
            if let Some(p) = skill.proficiency {
                if !(1..=5).contains(&p) {
                    return Err(format!(
                        "skill '{}' has proficiency {p}; expected 1 to 5",
                        skill.category
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn minimal() -> serde_json::Value {
        json!({
            "user_info": {
                "name": "Alice Kim",
                "title": "Backend Engineer",
                "summary": "Builds reliable services."
            }
        })
    }

    #[test]
    fn test_minimal_request_defaults() {
        let request: PortfolioRequest = serde_json::from_value(minimal()).unwrap();
        assert_eq!(request.format, OutputFormat::Markdown);
        assert!(request.experiences.is_empty());
        assert_eq!(request.template, "modern");
        assert_eq!(request.theme.as_deref(), Some("light"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_layout_and_theme_are_accepted() {
        let mut value = minimal();
        value["format"] = json!("html");
        value["template"] = json!("classic");
        value["theme"] = json!("dark");
        let request: PortfolioRequest = serde_json::from_value(value).unwrap();
        assert_eq!(request.format, OutputFormat::Html);
        assert_eq!(request.template, "classic");
        assert_eq!(request.theme.as_deref(), Some("dark"));

        let mut value = minimal();
        value["theme"] = json!(null);
        let request: PortfolioRequest = serde_json::from_value(value).unwrap();
        assert_eq!(request.theme, None);
    }

    #[test]
    fn test_experience_end_date_defaults_to_present() {
        let exp: Experience = serde_json::from_value(json!({
            "company": "Acme",
            "position": "Engineer",
            "start_date": "2021-03",
            "description": "Payments"
        }))
        .unwrap();
        assert_eq!(exp.end_date, "Present");
    }

    #[test]
    fn test_blank_summary_fails_validation() {
        let mut value = minimal();
        value["user_info"]["summary"] = json!("   ");
        let request: PortfolioRequest = serde_json::from_value(value).unwrap();
        assert_eq!(
            request.validate().unwrap_err(),
            "user_info.summary cannot be empty"
        );
    }

    #[test]
    fn test_proficiency_out_of_range_fails_validation() {
        let mut value = minimal();
        value["skills"] = json!([{"category": "Languages", "items": ["Rust"], "proficiency": 6}]);
        let request: PortfolioRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().unwrap_err().contains("proficiency 6"));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let mut value = minimal();
        value["format"] = json!("docx");
        assert!(serde_json::from_value::<PortfolioRequest>(value).is_err());
    }
}
