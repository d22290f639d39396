//! Markdown to HTML conversion and the standalone page shell around it.

use pulldown_cmark::{escape, html, Options, Parser};

const PAGE_STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; line-height: 1.6; color: #333; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; padding: 2rem; }
.container { max-width: 900px; margin: 0 auto; background: white; border-radius: 20px; box-shadow: 0 20px 60px rgba(0,0,0,0.3); overflow: hidden; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 3rem; text-align: center; }
.header h1 { font-size: 2.5rem; margin-bottom: 0.5rem; }
.header h2 { font-size: 1.5rem; font-weight: 300; opacity: 0.95; }
.contact { margin-top: 1.5rem; display: flex; justify-content: center; flex-wrap: wrap; gap: 1rem; }
.contact a { color: white; text-decoration: none; padding: 0.5rem 1rem; background: rgba(255,255,255,0.2); border-radius: 20px; }
.content { padding: 3rem; }
h2 { color: #667eea; margin-top: 2rem; margin-bottom: 1rem; padding-bottom: 0.5rem; border-bottom: 2px solid #f0f0f0; }
h3 { color: #764ba2; margin-top: 1.5rem; margin-bottom: 0.5rem; }
ul { margin-left: 1.5rem; margin-top: 0.5rem; }
li { margin-bottom: 0.5rem; }
@media (max-width: 768px) { body { padding: 1rem; } .header { padding: 2rem; } .header h1 { font-size: 2rem; } .content { padding: 2rem; } }
"#;

/// A link shown in the page header.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactLink {
    pub href: String,
    pub label: String,
    pub new_tab: bool,
}

/// Everything above the converted Markdown body.
#[derive(Debug, Clone, Default)]
pub struct PageHeader<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub contacts: Vec<ContactLink>,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape::escape_html(&mut out, text);
    out
}

pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Converts `markdown` and wraps it in a complete, styled HTML document.
pub fn render_page(header: &PageHeader<'_>, markdown: &str) -> String {
    let body = markdown_to_html(markdown);
    let name = escape_html(header.name);
    let title = escape_html(header.title);

    let contact_block = if header.contacts.is_empty() {
        String::new()
    } else {
        let links: Vec<String> = header
            .contacts
            .iter()
            .map(|link| {
                let target = if link.new_tab { r#" target="_blank""# } else { "" };
                format!(
                    r#"<a href="{}"{}>{}</a>"#,
                    escape_html(&link.href),
                    target,
                    escape_html(&link.label)
                )
            })
            .collect();
        format!(
            "\n            <div class=\"contact\">\n                {}\n            </div>",
            links.join("\n                ")
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name} - Portfolio</title>
    <style>{PAGE_STYLE}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{name}</h1>
            <h2>{title}</h2>{contact_block}
        </div>
        <div class="content">
{body}
        </div>
    </div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; 'Jerry'&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_leaves_plain_text_alone() {
        assert_eq!(escape_html("Alice Smith"), "Alice Smith");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_markdown_to_html_basics() {
        let html = markdown_to_html("## Projects\n\n- **Fast** service\n");
        assert!(html.contains("<h2>Projects</h2>"));
        assert!(html.contains("<li><strong>Fast</strong> service</li>"));
    }

    #[test]
    fn test_render_page_escapes_header_and_includes_body() {
        let header = PageHeader {
            name: "Alice <Admin>",
            title: "Engineer",
            contacts: vec![ContactLink {
                href: "mailto:alice@example.com".to_string(),
                label: "alice@example.com".to_string(),
                new_tab: false,
            }],
        };
        let page = render_page(&header, "Hello **world**");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Alice &lt;Admin&gt; - Portfolio</title>"));
        assert!(page.contains(r#"<a href="mailto:alice@example.com">alice@example.com</a>"#));
        assert!(page.contains("<strong>world</strong>"));
    }

    #[test]
    fn test_render_page_without_contacts_has_no_contact_block() {
        let header = PageHeader {
            name: "Portfolio",
            title: "Professional",
            contacts: vec![],
        };
        assert!(!render_page(&header, "x").contains("class=\"contact\""));
    }
}
