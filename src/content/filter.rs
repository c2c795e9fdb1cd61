//! Post selection from a directory listing

use crate::api::FileEntry;
use crate::config::{BlogConfig, MonitorFilter};

/// Decides which listing entries are blog posts
#[derive(Debug, Clone)]
pub struct PostSelector {
    extension: String,
    readme: String,
}

impl PostSelector {
    pub fn new(extension: &str, readme: &str) -> Self {
        Self {
            extension: extension.to_string(),
            readme: readme.to_string(),
        }
    }

    pub fn from_config(config: &BlogConfig) -> Self {
        Self::new(&config.post_extension, &config.readme)
    }

    /// A regular file with the post extension that is not the readme (any case)
    pub fn is_post(&self, entry: &FileEntry) -> bool {
        entry.is_file()
            && entry.name.ends_with(&self.extension)
            && !entry.name.eq_ignore_ascii_case(&self.readme)
    }

    /// Posts of a listing, newest first
    ///
    /// Names sort descending so date-prefixed files (`2024-05-01-...`) come
    /// out newest first; no commit date is known at this point.
    pub fn select(&self, entries: &[FileEntry]) -> Vec<FileEntry> {
        let mut posts: Vec<FileEntry> = entries
            .iter()
            .filter(|e| self.is_post(e))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.name.cmp(&a.name));
        posts
    }

    /// Number of posts as counted by the monitor
    ///
    /// `Exact` skips the entry type check and only excludes the readme when
    /// spelled with an upper-case stem (`README.md`).
    pub fn monitor_count(&self, entries: &[FileEntry], filter: MonitorFilter) -> usize {
        match filter {
            MonitorFilter::Shared => entries.iter().filter(|e| self.is_post(e)).count(),
            MonitorFilter::Exact => {
                let readme = canonical_readme(&self.readme);
                entries
                    .iter()
                    .filter(|e| e.name.ends_with(&self.extension) && e.name != readme)
                    .count()
            }
        }
    }
}

impl Default for PostSelector {
    fn default() -> Self {
        Self::from_config(&BlogConfig::default())
    }
}

/// `readme.md` -> `README.md`
fn canonical_readme(readme: &str) -> String {
    match readme.rsplit_once('.') {
        Some((stem, ext)) => format!("{}.{}", stem.to_uppercase(), ext),
        None => readme.to_uppercase(),
    }
}
