//! Content module - post selection, models and markdown rendering

mod filter;
mod markdown;
mod post;

pub use filter::PostSelector;
pub use markdown::MarkdownRenderer;
pub use post::{title_from_filename, Post};
