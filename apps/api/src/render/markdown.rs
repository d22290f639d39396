//! Fixed Markdown layout for structured `PortfolioRequest` input.
//! Sections are emitted in a set order and skipped when empty.

use crate::models::portfolio::PortfolioRequest;
use crate::render::html::{render_page, ContactLink, PageHeader};

pub fn build_markdown(request: &PortfolioRequest) -> String {
    let info = &request.user_info;
    let mut md: Vec<String> = Vec::new();

    md.push(format!("# {}", info.name));
    md.push(format!("## {}", info.title));
    md.push(String::new());

    let mut contact_items = Vec::new();
    if let Some(email) = &info.email {
        contact_items.push(format!("📧 {email}"));
    }
    if let Some(phone) = &info.phone {
        contact_items.push(format!("📱 {phone}"));
    }
    if let Some(location) = &info.location {
        contact_items.push(format!("📍 {location}"));
    }
    if let Some(linkedin) = &info.linkedin {
        contact_items.push(format!("🔗 [LinkedIn]({linkedin})"));
    }
    if let Some(github) = &info.github {
        contact_items.push(format!("🐙 [GitHub]({github})"));
    }
    if let Some(website) = &info.website {
        contact_items.push(format!("🌐 [Website]({website})"));
    }
    if !contact_items.is_empty() {
        md.push(contact_items.join(" | "));
        md.push(String::new());
    }

    md.push("## About".to_string());
    md.push(info.summary.clone());
    md.push(String::new());

    if !request.experiences.is_empty() {
        md.push("## Experience".to_string());
        for exp in &request.experiences {
            md.push(format!("### {}", exp.company));
            md.push(format!(
                "**{}** | {} - {}",
                exp.position, exp.start_date, exp.end_date
            ));
            md.push(String::new());
            md.push(exp.description.clone());
            if !exp.achievements.is_empty() {
                md.push(String::new());
                md.extend(exp.achievements.iter().map(|a| format!("- {a}")));
            }
            if !exp.technologies.is_empty() {
                md.push(String::new());
                md.push(format!("**Tech stack:** {}", exp.technologies.join(", ")));
            }
            md.push(String::new());
        }
    }

    if !request.projects.is_empty() {
        md.push("## Projects".to_string());
        for project in &request.projects {
            md.push(format!("### {}", project.name));
            if let Some(date) = &project.date {
                md.push(format!("*{date}*"));
            }
            md.push(String::new());
            if let Some(image) = &project.image_url {
                md.push(format!("![{}]({image})", project.name));
                md.push(String::new());
            }
            md.push(project.description.clone());
            md.push(String::new());

            if !project.highlights.is_empty() {
                md.push("**Highlights:**".to_string());
                md.extend(project.highlights.iter().map(|h| format!("- {h}")));
                md.push(String::new());
            }
            if !project.technologies.is_empty() {
                md.push(format!("**Tech stack:** {}", project.technologies.join(", ")));
                md.push(String::new());
            }

            let mut links = Vec::new();
            if let Some(url) = &project.url {
                links.push(format!("[🔗 Live Demo]({url})"));
            }
            if let Some(github_url) = &project.github_url {
                links.push(format!("[📦 GitHub]({github_url})"));
            }
            if !links.is_empty() {
                md.push(links.join(" | "));
                md.push(String::new());
            }
        }
    }

    if !request.skills.is_empty() {
        md.push("## Skills".to_string());
        for skill in &request.skills {
            md.push(format!("### {}", skill.category));
            let items = skill.items.join(", ");
            match skill.proficiency {
                Some(p) => {
                    let filled = usize::from(p.min(5));
                    md.push(format!("{items} ({}{})", "★".repeat(filled), "☆".repeat(5 - filled)));
                }
                None => md.push(items),
            }
            md.push(String::new());
        }
    }

    if !request.education.is_empty() {
        md.push("## Education".to_string());
        for edu in &request.education {
            md.push(format!("### {}", edu.institution));
            md.push(format!("**{}** in {}", edu.degree, edu.field));
            md.push(format!(
                "{} - {}",
                edu.start_date,
                edu.end_date.as_deref().unwrap_or("Present")
            ));
            if let Some(gpa) = edu.gpa.filter(|g| *g > 0.0) {
                md.push(format!("GPA: {gpa}"));
            }
            md.extend(edu.achievements.iter().map(|a| format!("- {a}")));
            md.push(String::new());
        }
    }

    if !request.certifications.is_empty() {
        md.push("## Certifications".to_string());
        md.extend(request.certifications.iter().map(|c| format!("- {c}")));
        md.push(String::new());
    }

    if !request.languages.is_empty() {
        md.push("## Languages".to_string());
        for language in &request.languages {
            let parts: Vec<&str> = language.values().map(String::as_str).collect();
            md.push(format!("- {}", parts.join(" - ")));
        }
        md.push(String::new());
    }

    md.join("\n")
}

/// The structured Markdown converted into a full HTML page with contact links.
pub fn build_html(request: &PortfolioRequest) -> String {
    let info = &request.user_info;
    let mut contacts = Vec::new();
    if let Some(email) = &info.email {
        contacts.push(ContactLink {
            href: format!("mailto:{email}"),
            label: format!("📧 {email}"),
            new_tab: false,
        });
    }
    if let Some(phone) = &info.phone {
        contacts.push(ContactLink {
            href: format!("tel:{phone}"),
            label: format!("📱 {phone}"),
            new_tab: false,
        });
    }
    if let Some(linkedin) = &info.linkedin {
        contacts.push(ContactLink {
            href: linkedin.clone(),
            label: "🔗 LinkedIn".to_string(),
            new_tab: true,
        });
    }
    if let Some(github) = &info.github {
        contacts.push(ContactLink {
            href: github.clone(),
            label: "🐙 GitHub".to_string(),
            new_tab: true,
        });
    }

    let header = PageHeader {
        name: &info.name,
        title: &info.title,
        contacts,
    };
    render_page(&header, &build_markdown(request))
}
