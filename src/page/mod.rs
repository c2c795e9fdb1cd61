//! The reader page
//!
//! [`Page`] is the document the reader mutates: a posts container, the
//! show-all toggle button and the notification banners. It renders to a
//! complete HTML document.

mod notification;

pub use notification::{new_posts_message, Notification, NotificationCenter};

use chrono::{DateTime, Utc};

use crate::config::BlogConfig;
use crate::content::Post;
use crate::helpers::{html_escape, post_button};

/// Toggle label while only the latest post is shown
pub const SHOW_ALL_LABEL: &str = "📚 Show All Blogs";
/// Toggle label while every post is shown
pub const SHOW_RECENT_LABEL: &str = "📄 Show Recent Only";

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; max-width: 760px; margin: 0 auto; padding: 1rem; color: #222; }
header { display: flex; justify-content: space-between; align-items: center; }
.loading, .error { padding: 1rem; text-align: center; }
.error { color: #b00020; }
.blog-post { border-bottom: 1px solid #eee; padding: 1rem 0; }
.post-meta { color: #777; font-size: 0.9rem; }
.notification { position: fixed; top: 1rem; right: 1rem; background: #2e7d32; color: #fff; padding: 0.75rem 1rem; border-radius: 6px; }
.notification form { display: inline; }
"#;

/// Script that reloads the page when the server announces new posts
const EVENTS_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__events');
    ws.onmessage = function(msg) {
        if (msg.data.indexOf('notify:') === 0) {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Event stream disconnected.');
    };
    document.querySelectorAll('.notification').forEach(function(el) {
        setTimeout(function() {
            if (el.parentElement) {
                el.remove();
            }
        }, Number(el.dataset.ttl) * 1000);
    });
})();
</script>
"#;

/// One block of the posts container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Loading,
    /// The listing could not be fetched
    LoadFailed(String),
    /// The listing holds no posts
    Empty,
    Article(Post),
}

/// The reader document
#[derive(Debug, Clone)]
pub struct Page {
    title: String,
    container_id: String,
    toggle_button_id: String,
    toggle_label: &'static str,
    blocks: Vec<Block>,
    pub notifications: NotificationCenter,
}

impl Page {
    pub fn new(config: &BlogConfig) -> Self {
        Self {
            title: config.title.clone(),
            container_id: config.container_id.clone(),
            toggle_button_id: config.toggle_button_id.clone(),
            toggle_label: SHOW_ALL_LABEL,
            blocks: Vec::new(),
            notifications: NotificationCenter::new(config.notification_ttl()),
        }
    }

    /// Replace the container content with a loading indicator
    pub fn set_loading(&mut self) {
        self.blocks = vec![Block::Loading];
    }

    pub fn show_error(&mut self, message: &str) {
        self.blocks = vec![Block::LoadFailed(message.to_string())];
    }

    pub fn show_empty(&mut self) {
        self.blocks = vec![Block::Empty];
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn append(&mut self, post: Post) {
        self.blocks.push(Block::Article(post));
    }

    pub fn set_showing_all(&mut self, showing_all: bool) {
        self.toggle_label = if showing_all {
            SHOW_RECENT_LABEL
        } else {
            SHOW_ALL_LABEL
        };
    }

    pub fn toggle_label(&self) -> &str {
        self.toggle_label
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Posts currently in the container, in display order
    pub fn articles(&self) -> impl Iterator<Item = &Post> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Article(post) => Some(post),
            _ => None,
        })
    }

    /// An empty page with the same title, ids and toggle label
    pub fn blank(&self) -> Page {
        Page {
            title: self.title.clone(),
            container_id: self.container_id.clone(),
            toggle_button_id: self.toggle_button_id.clone(),
            toggle_label: self.toggle_label,
            blocks: Vec::new(),
            notifications: NotificationCenter::default(),
        }
    }

    /// Take the posts container and toggle label of `rendered`, keeping banners
    pub fn replace_content(&mut self, rendered: Page) {
        self.blocks = rendered.blocks;
        self.toggle_label = rendered.toggle_label;
    }

    /// Render the whole document; `live` adds the event stream script
    ///
    /// Banner timers start from the time each banner has left at `now`.
    pub fn render_html(&self, live: bool, now: DateTime<Utc>) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", html_escape(&self.title)));
        html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));

        html.push_str(&format!(
            "<header><h1>{}</h1>{}</header>\n",
            html_escape(&self.title),
            post_button("/toggle", Some(self.toggle_button_id.as_str()), self.toggle_label)
        ));

        for notification in self.notifications.active() {
            html.push_str(&self.render_notification(notification, now));
        }

        html.push_str(&format!(
            "<main id=\"{}\">\n",
            html_escape(&self.container_id)
        ));
        for block in &self.blocks {
            html.push_str(&render_block(block));
        }
        html.push_str("</main>\n");

        if live {
            html.push_str(EVENTS_SCRIPT);
        }
        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_notification(&self, notification: &Notification, now: DateTime<Utc>) -> String {
        format!(
            "<div class=\"notification\" data-id=\"{id}\" data-ttl=\"{ttl}\">{message} {refresh}{dismiss}</div>\n",
            id = notification.id,
            ttl = self.notifications.remaining_secs(notification, now),
            message = html_escape(&notification.message()),
            refresh = post_button(
                &format!("/notifications/{}/refresh", notification.id),
                None,
                "Refresh"
            ),
            dismiss = post_button(
                &format!("/notifications/{}/dismiss", notification.id),
                None,
                "✕"
            ),
        )
    }
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Loading => "<div class=\"loading\">Loading posts...</div>\n".to_string(),
        Block::LoadFailed(message) => format!(
            "<div class=\"error\">Error loading posts: {}<br><br>Make sure the repository is public and accessible.</div>\n",
            html_escape(message)
        ),
        Block::Empty => {
            "<div class=\"error\">No blog posts found in repository</div>\n".to_string()
        }
        Block::Article(post) => render_article(post),
    }
}

fn render_article(post: &Post) -> String {
    format!(
        r#"<article class="blog-post">
    <h2 class="post-title">{}</h2>
    <div class="post-meta">
        <span class="post-date">{}</span>
    </div>
    <div class="post-content">
        {}
    </div>
</article>
"#,
        html_escape(&post.title),
        html_escape(&post.date),
        post.content
    )
}
