//! Background polling for new posts
//!
//! The monitor re-fetches the listing on a fixed period and broadcasts a
//! [`MonitorEvent`] when the post count grows. It never retries or backs
//! off; a failed check is logged and the next tick proceeds as usual.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, RepoSource};
use crate::config::{BlogConfig, MonitorFilter};
use crate::content::PostSelector;

/// Event emitted by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// The listing grew by this many posts
    NewPosts(usize),
}

/// Post count seen on the previous check
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorState {
    last_post_count: usize,
}

impl MonitorState {
    /// Record a new count and return how many posts to announce
    ///
    /// The first non-zero observation only sets the baseline.
    pub fn observe(&mut self, count: usize) -> Option<usize> {
        let previous = self.last_post_count;
        self.last_post_count = count;
        (previous > 0 && count > previous).then(|| count - previous)
    }

    pub fn last_post_count(&self) -> usize {
        self.last_post_count
    }
}

/// Periodic listing checker
pub struct Monitor {
    source: Arc<dyn RepoSource>,
    selector: PostSelector,
    filter: MonitorFilter,
    period: Duration,
    state: MonitorState,
}

impl Monitor {
    pub fn new(config: &BlogConfig, source: Arc<dyn RepoSource>) -> Self {
        Self {
            source,
            selector: PostSelector::from_config(config),
            filter: config.monitor_filter,
            period: config.poll_period(),
            state: MonitorState::default(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Run one check against the listing
    pub async fn check(&mut self) -> Result<Option<usize>, ApiError> {
        let entries = self.source.list_entries().await?;
        let count = self.selector.monitor_count(&entries, self.filter);
        tracing::debug!("Monitor sees {} posts", count);
        Ok(self.state.observe(count))
    }

    /// Poll until `cancel` fires; the first check runs one period after start
    pub async fn run(mut self, events: broadcast::Sender<MonitorEvent>, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.check().await {
                        Ok(Some(count)) => {
                            tracing::info!("{} new post(s) detected", count);
                            // no subscribers is fine
                            let _ = events.send(MonitorEvent::NewPosts(count));
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("Monitoring check failed: {}", e),
                    }
                }
            }
        }

        tracing::debug!("Monitor stopped");
    }

    /// Run on a background task
    pub fn spawn(self, events: broadcast::Sender<MonitorEvent>) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(events, cancel.clone()));
        MonitorHandle { cancel, task }
    }
}

/// Handle to a spawned monitor
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Cancel and wait for the task to finish
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!("Monitor task failed: {}", e);
        }
    }
}
