//! New-post notification banners

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Banner text for `count` new posts
pub fn new_posts_message(count: usize) -> String {
    format!(
        "🎉 {} new blog post{} added!",
        count,
        if count > 1 { "s" } else { "" }
    )
}

/// A dismissible banner announcing new posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub count: usize,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn message(&self) -> String {
        new_posts_message(self.count)
    }
}

/// Active banners, expiring after a fixed time
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    next_id: u64,
    items: Vec<Notification>,
    ttl: Duration,
}

impl NotificationCenter {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            next_id: 1,
            items: Vec::new(),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::seconds(10)),
        }
    }

    /// Add a banner and return its id
    pub fn push(&mut self, count: usize, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notification {
            id,
            count,
            created_at: now,
        });
        id
    }

    /// Remove a banner; false when it was already gone
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Drop banners older than the time-to-live
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.items.retain(|n| now - n.created_at < ttl);
    }

    pub fn active(&self) -> &[Notification] {
        &self.items
    }

    /// Whole seconds `notification` has left on screen at `now`
    pub fn remaining_secs(&self, notification: &Notification, now: DateTime<Utc>) -> i64 {
        (self.ttl - (now - notification.created_at))
            .num_seconds()
            .max(0)
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(10))
    }
}
