//! GitHub REST API client

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{ApiError, CommitDate, CommitInfo, FileEntry, RepoSource};
use crate::config::BlogConfig;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Client for one repository on the GitHub API
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    repo_url: String,
}

impl GitHubClient {
    /// Build a client for the repository named in `config`
    pub fn new(config: &BlogConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.request_timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(to_network_error)?;

        Ok(Self {
            http,
            repo_url: config.repo_api_url(),
        })
    }

    /// URL of the root directory listing
    pub fn contents_url(&self) -> String {
        format!("{}/contents", self.repo_url)
    }

    /// URL of the single most recent commit touching `path`
    pub fn commits_url(&self, path: &str) -> String {
        format!(
            "{}/commits?path={}&per_page=1",
            self.repo_url,
            utf8_percent_encode(path, NON_ALPHANUMERIC)
        )
    }

    /// GET a URL, turning non-success statuses into [`ApiError::Http`]
    async fn get(&self, url: &str) -> Result<reqwest::Response, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(to_network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let body = self
            .get(url)
            .await?
            .text()
            .await
            .map_err(to_network_error)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn list_entries(&self) -> Result<Vec<FileEntry>, ApiError> {
        let entries: Vec<FileEntry> = self.get_json(&self.contents_url()).await?;
        tracing::debug!(
            "Files found: {} ({:?})",
            entries.len(),
            entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>()
        );
        Ok(entries)
    }

    async fn fetch_body(&self, entry: &FileEntry) -> Result<String, ApiError> {
        let url = entry
            .download_url
            .as_deref()
            .ok_or_else(|| ApiError::MissingDownloadUrl(entry.name.clone()))?;
        self.get(url).await?.text().await.map_err(to_network_error)
    }

    async fn latest_commit_date(&self, path: &str) -> Result<CommitDate, ApiError> {
        let commits: Vec<CommitInfo> = self.get_json(&self.commits_url(path)).await?;
        Ok(CommitDate::from_commits(&commits))
    }
}

fn to_network_error(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}
