//! Post model

use serde::Serialize;

use super::MarkdownRenderer;
use crate::api::FileEntry;

/// A rendered blog post
///
/// Built fresh from a listing entry on every render and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Source file name in the repository
    pub source: String,

    /// Title derived from the file name
    pub title: String,

    /// Relative date of the latest commit ("5h ago", "Recent", ...)
    pub date: String,

    /// Rendered HTML content
    pub content: String,
}

impl Post {
    /// Render a post from its listing entry and raw markdown body
    pub fn render(
        entry: &FileEntry,
        extension: &str,
        body: &str,
        date: String,
        renderer: &MarkdownRenderer,
    ) -> Self {
        Self {
            source: entry.name.clone(),
            title: title_from_filename(&entry.name, extension),
            date,
            content: renderer.render(body),
        }
    }
}

/// `my-first-post.md` -> `my first post`
///
/// Only the first occurrence of the extension is removed.
pub fn title_from_filename(name: &str, extension: &str) -> String {
    name.replacen(extension, "", 1).replace('-', " ")
}
