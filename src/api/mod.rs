//! Repository API access
//!
//! Everything the reader needs from the hosting service goes through the
//! [`RepoSource`] trait: the directory listing, raw file bodies and the
//! latest commit date of a file. [`GitHubClient`] is the production
//! implementation backed by the GitHub REST API.

#[cfg(test)]
pub(crate) mod fake;
mod github;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use github::GitHubClient;

/// Errors returned by a [`RepoSource`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("GitHub API returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("No download URL for {0}")]
    MissingDownloadUrl(String),
}

/// Kind of a directory listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of the repository's root directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Raw content URL, null for directories
    #[serde(default)]
    pub download_url: Option<String>,
}

impl FileEntry {
    pub fn file(name: &str, download_url: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::File,
            download_url: Some(download_url.to_string()),
        }
    }

    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::Dir,
            download_url: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Commit object as returned by the commits endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub date: DateTime<Utc>,
}

/// Result of a latest-commit lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitDate {
    At(DateTime<Utc>),
    /// The path has no commit history
    Unknown,
}

impl CommitDate {
    /// Date of the first commit in a history page
    pub fn from_commits(commits: &[CommitInfo]) -> Self {
        commits
            .first()
            .and_then(|c| c.commit.author.as_ref())
            .map(|author| CommitDate::At(author.date))
            .unwrap_or(CommitDate::Unknown)
    }
}

/// Source of blog entries
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// Fetch the raw root directory listing
    async fn list_entries(&self) -> Result<Vec<FileEntry>, ApiError>;

    /// Fetch the raw text of an entry
    async fn fetch_body(&self, entry: &FileEntry) -> Result<String, ApiError>;

    /// Author date of the most recent commit touching `path`
    async fn latest_commit_date(&self, path: &str) -> Result<CommitDate, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let json = r#"[
            {"name": "2024-01-01-hello.md", "type": "file", "download_url": "https://raw/hello.md", "size": 12},
            {"name": "assets", "type": "dir", "download_url": null},
            {"name": "link", "type": "weird"}
        ]"#;
        let entries: Vec<FileEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], FileEntry::file("2024-01-01-hello.md", "https://raw/hello.md"));
        assert_eq!(entries[1], FileEntry::dir("assets"));
        assert_eq!(entries[2].kind, EntryKind::Other);
        assert!(entries[2].download_url.is_none());
    }

    #[test]
    fn test_commit_date_from_commits() {
        let json = r#"[
            {"sha": "abc", "commit": {"author": {"name": "a", "date": "2024-03-01T12:00:00Z"}}},
            {"sha": "def", "commit": {"author": {"name": "a", "date": "2023-01-01T00:00:00Z"}}}
        ]"#;
        let commits: Vec<CommitInfo> = serde_json::from_str(json).unwrap();
        let expected = "2024-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(CommitDate::from_commits(&commits), CommitDate::At(expected));
        assert_eq!(CommitDate::from_commits(&[]), CommitDate::Unknown);
    }

    #[test]
    fn test_http_error_message() {
        let err = ApiError::Http {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "GitHub API returned 404: Not Found");
    }
}
