//! repo-blog: read a public GitHub repository of markdown files as a blog
//!
//! The root directory of the repository is listed through the GitHub API,
//! markdown files become posts (newest name first), and a monitor polls the
//! listing to announce new posts while the reader is open.

pub mod api;
pub mod clock;
pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod monitor;
pub mod page;
pub mod reader;
pub mod server;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use api::{GitHubClient, RepoSource};
use clock::{Clock, SystemClock};

/// Configuration file looked up in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// The main application
#[derive(Clone)]
pub struct RepoBlog {
    /// Blog configuration
    pub config: config::BlogConfig,
    source: Arc<dyn RepoSource>,
    clock: Arc<dyn Clock>,
}

impl RepoBlog {
    /// Create an instance from a directory, reading `_config.yml` when present
    ///
    /// `repository` (`owner/name`) overrides the configured repository.
    pub fn new<P: AsRef<Path>>(base_dir: P, repository: Option<&str>) -> Result<Self> {
        let config_path = base_dir.as_ref().join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::BlogConfig::load(&config_path)?
        } else {
            config::BlogConfig::default()
        };
        if let Some(repository) = repository {
            config.set_repository(repository)?;
        }

        Self::from_config(config)
    }

    /// Create an instance talking to GitHub
    pub fn from_config(config: config::BlogConfig) -> Result<Self> {
        let client = GitHubClient::new(&config)?;
        Ok(Self::with_source(config, Arc::new(client), Arc::new(SystemClock)))
    }

    /// Create an instance over any post source
    pub fn with_source(
        config: config::BlogConfig,
        source: Arc<dyn RepoSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            source,
            clock,
        }
    }

    pub fn reader(&self) -> reader::Reader {
        reader::Reader::new(&self.config, self.source.clone(), self.clock.clone())
    }

    pub fn monitor(&self) -> monitor::Monitor {
        monitor::Monitor::new(&self.config, self.source.clone())
    }

    pub fn source(&self) -> Arc<dyn RepoSource> {
        self.source.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// An empty page for this blog
    pub fn page(&self) -> page::Page {
        page::Page::new(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let blog = RepoBlog::new(dir.path(), None).unwrap();
        assert_eq!(blog.config.owner, "Isu-Patel");
        assert_eq!(blog.config.repo, "Milan_Rutu_Project");
    }

    #[test]
    fn test_new_reads_config_and_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "owner: someone\nrepo: diary\ntitle: Diary\n").unwrap();

        let blog = RepoBlog::new(dir.path(), None).unwrap();
        assert_eq!(blog.config.owner, "someone");
        assert_eq!(blog.config.title, "Diary");

        let blog = RepoBlog::new(dir.path(), Some("other/notes")).unwrap();
        assert_eq!(blog.config.owner, "other");
        assert_eq!(blog.config.repo, "notes");
        assert_eq!(blog.config.title, "Diary");
    }

    #[test]
    fn test_new_rejects_bad_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RepoBlog::new(dir.path(), Some("no-slash")).is_err());
    }
}
