//! Loading posts into the page and switching between latest and all posts

use chrono::Local;
use std::sync::Arc;

use crate::api::{ApiError, CommitDate, FileEntry, RepoSource};
use crate::clock::Clock;
use crate::config::BlogConfig;
use crate::content::{MarkdownRenderer, Post, PostSelector};
use crate::helpers::{time_ago, RECENT};
use crate::page::Page;

/// Reader state kept between requests
///
/// The cached list is only replaced by [`Reader::load`]; toggling always
/// works on the last list fetched.
#[derive(Debug, Clone, Default)]
pub struct Session {
    showing_all: bool,
    posts: Option<Vec<FileEntry>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start in the "all posts" view
    pub fn showing_all_posts() -> Self {
        Self {
            showing_all: true,
            posts: None,
        }
    }

    pub fn showing_all(&self) -> bool {
        self.showing_all
    }

    /// Posts from the last successful load, newest first
    pub fn posts(&self) -> Option<&[FileEntry]> {
        self.posts.as_deref()
    }
}

/// Fetches, renders and places posts on a [`Page`]
#[derive(Clone)]
pub struct Reader {
    source: Arc<dyn RepoSource>,
    clock: Arc<dyn Clock>,
    selector: PostSelector,
    renderer: MarkdownRenderer,
    extension: String,
}

impl Reader {
    pub fn new(config: &BlogConfig, source: Arc<dyn RepoSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            selector: PostSelector::from_config(config),
            renderer: MarkdownRenderer::with_options(config.escape_html),
            extension: config.post_extension.clone(),
        }
    }

    /// Fetch the listing and render the latest post, or all of them
    ///
    /// Listing failures are shown on the page and returned; failures of a
    /// single post are logged and that post is left out. Returns the number
    /// of posts in the listing.
    pub async fn load(&self, session: &mut Session, page: &mut Page) -> Result<usize, ApiError> {
        page.set_loading();
        tracing::info!("Fetching posts...");

        let entries = match self.source.list_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("Error loading posts: {}", e);
                page.show_error(&e.to_string());
                return Err(e);
            }
        };

        let posts = self.selector.select(&entries);
        tracing::debug!(
            "Markdown files: {:?}",
            posts.iter().map(|e| e.name.as_str()).collect::<Vec<_>>()
        );

        page.clear();
        if posts.is_empty() {
            page.show_empty();
            session.posts = None;
            return Ok(0);
        }

        self.display_posts(&posts, session.showing_all, page).await;
        let count = posts.len();
        session.posts = Some(posts);
        Ok(count)
    }

    /// Flip between the latest post and all posts
    ///
    /// Returns false, leaving everything untouched, when nothing has been
    /// loaded yet.
    pub async fn toggle(&self, session: &mut Session, page: &mut Page) -> bool {
        let Some(posts) = session.posts.clone() else {
            tracing::info!("No blogs loaded yet");
            return false;
        };

        session.showing_all = !session.showing_all;
        page.set_showing_all(session.showing_all);
        page.clear();
        self.display_posts(&posts, session.showing_all, page).await;
        true
    }

    async fn display_posts(&self, posts: &[FileEntry], all: bool, page: &mut Page) {
        let shown = if all { posts } else { &posts[..posts.len().min(1)] };
        for entry in shown {
            self.display(entry, page).await;
        }
    }

    /// Render one post and append it to the page
    pub async fn display(&self, entry: &FileEntry, page: &mut Page) {
        match self.render_post(entry).await {
            Ok(post) => page.append(post),
            Err(e) => tracing::error!("Error loading blog {}: {}", entry.name, e),
        }
    }

    /// Fetch and render one post
    ///
    /// A failed commit lookup only degrades the date to "Recent".
    pub async fn render_post(&self, entry: &FileEntry) -> Result<Post, ApiError> {
        let date = match self.source.latest_commit_date(&entry.name).await {
            Ok(CommitDate::At(date)) => time_ago(&date.with_timezone(&Local), &self.clock.now()),
            Ok(CommitDate::Unknown) => RECENT.to_string(),
            Err(e) => {
                tracing::warn!("Commit date unavailable for {}: {}", entry.name, e);
                RECENT.to_string()
            }
        };

        let body = self.source.fetch_body(entry).await?;
        Ok(Post::render(
            entry,
            &self.extension,
            &body,
            date,
            &self.renderer,
        ))
    }
}
