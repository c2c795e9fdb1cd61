//! Blog configuration (_config.yml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Longest poll period, one week
const MAX_POLL_INTERVAL: u64 = 7 * 24 * 60 * 60;

/// Main blog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    // Repository
    pub owner: String,
    pub repo: String,
    pub api_url: String,
    pub user_agent: String,
    /// Request timeout in seconds, none by default
    pub request_timeout: Option<u64>,

    // Posts
    pub post_extension: String,
    pub readme: String,
    pub escape_html: bool,

    // Page
    pub title: String,
    pub container_id: String,
    pub toggle_button_id: String,

    // Monitoring
    /// Polling period in seconds
    pub poll_interval: u64,
    /// Seconds before a notification banner disappears on its own
    pub notification_timeout: u64,
    pub monitor_filter: MonitorFilter,
}

/// How the monitor counts posts in a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MonitorFilter {
    /// Extension match plus an exact, case-sensitive readme check
    #[default]
    Exact,
    /// Same selection as the rendered post list
    Shared,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            owner: "Isu-Patel".to_string(),
            repo: "Milan_Rutu_Project".to_string(),
            api_url: "https://api.github.com".to_string(),
            user_agent: "repo-blog".to_string(),
            request_timeout: None,

            post_extension: ".md".to_string(),
            readme: "readme.md".to_string(),
            escape_html: true,

            title: "Blog".to_string(),
            container_id: "blog-posts".to_string(),
            toggle_button_id: "showAllBtn".to_string(),

            poll_interval: 30,
            notification_timeout: 10,
            monitor_filter: MonitorFilter::Exact,
        }
    }
}

impl BlogConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: BlogConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Override owner and repository from an `owner/name` pair
    pub fn set_repository(&mut self, spec: &str) -> Result<()> {
        match spec.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                self.owner = owner.to_string();
                self.repo = repo.to_string();
                Ok(())
            }
            _ => bail!("Invalid repository '{}', expected owner/name", spec),
        }
    }

    /// Base URL of the repository API, e.g. `https://api.github.com/repos/o/r`
    pub fn repo_api_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// Poll period, between one second and one week
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_interval.clamp(1, MAX_POLL_INTERVAL))
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_timeout)
    }
}
