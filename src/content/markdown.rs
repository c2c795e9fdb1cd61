//! Markdown to HTML conversion
//!
//! A fixed chain of regex substitutions. Headings, bold, italic and
//! paragraphs are recognised; lists, links, code and tables pass through
//! as plain paragraph text.

use lazy_static::lazy_static;
use regex::Regex;

use crate::helpers::html_escape;

lazy_static! {
    static ref H1: Regex = Regex::new(r"(?m)^# (.*)$").unwrap();
    static ref H2: Regex = Regex::new(r"(?m)^## (.*)$").unwrap();
    static ref H3: Regex = Regex::new(r"(?m)^### (.*)$").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref HEADING_LINE: Regex = Regex::new(r"^<h[1-3]>.*</h[1-3]>$").unwrap();
}

/// Regex-based markdown renderer
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    escape_html: bool,
}

impl MarkdownRenderer {
    /// Create a renderer that escapes raw HTML in the source
    pub fn new() -> Self {
        Self { escape_html: true }
    }

    /// Create with custom settings
    pub fn with_options(escape_html: bool) -> Self {
        Self { escape_html }
    }

    /// Render markdown to an HTML fragment
    pub fn render(&self, markdown: &str) -> String {
        let text = markdown.replace("\r\n", "\n");
        let text = if self.escape_html {
            html_escape(&text)
        } else {
            text
        };

        // Order matters: headings must be converted before paragraph wrapping
        let text = H1.replace_all(&text, "<h1>$1</h1>");
        let text = H2.replace_all(&text, "<h2>$1</h2>");
        let text = H3.replace_all(&text, "<h3>$1</h3>");
        let text = BOLD.replace_all(&text, "<strong>$1</strong>");
        let text = ITALIC.replace_all(&text, "<em>$1</em>");
        let text = text.replace("\n\n", "</p><p>");

        let wrapped = text
            .split('\n')
            .map(|line| {
                if line.is_empty() || HEADING_LINE.is_match(line) {
                    line.to_string()
                } else {
                    format!("<p>{}</p>", line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        wrapped.replace("<p></p>", "")
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
