//! In-memory [`RepoSource`] for tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{ApiError, CommitDate, FileEntry, RepoSource};

/// Serves scripted listings; the last listing repeats once the script runs out
#[derive(Default)]
pub struct FakeSource {
    listings: Mutex<VecDeque<Result<Vec<FileEntry>, ApiError>>>,
    bodies: HashMap<String, Result<String, ApiError>>,
    commit_dates: HashMap<String, Result<CommitDate, ApiError>>,
    list_calls: AtomicUsize,
    stalled: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(self, entries: Vec<FileEntry>) -> Self {
        self.with_listing_result(Ok(entries))
    }

    pub fn with_listing_result(self, listing: Result<Vec<FileEntry>, ApiError>) -> Self {
        self.listings.lock().unwrap().push_back(listing);
        self
    }

    pub fn with_post(mut self, name: &str, body: &str, date: CommitDate) -> Self {
        self.bodies.insert(name.to_string(), Ok(body.to_string()));
        self.commit_dates.insert(name.to_string(), Ok(date));
        self
    }

    pub fn with_body_error(mut self, name: &str, error: ApiError) -> Self {
        self.bodies.insert(name.to_string(), Err(error));
        self
    }

    pub fn with_commit_error(mut self, name: &str, error: ApiError) -> Self {
        self.commit_dates.insert(name.to_string(), Err(error));
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Make every later body fetch wait forever, like a hung connection
    pub fn stall_bodies(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }
}

/// Files named `names`, each with a fake download URL
pub fn files(names: &[&str]) -> Vec<FileEntry> {
    names
        .iter()
        .map(|name| FileEntry::file(name, &format!("https://raw.test/{}", name)))
        .collect()
}

#[async_trait]
impl RepoSource for FakeSource {
    async fn list_entries(&self) -> Result<Vec<FileEntry>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut listings = self.listings.lock().unwrap();
        if listings.len() > 1 {
            listings.pop_front().unwrap()
        } else {
            listings.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    async fn fetch_body(&self, entry: &FileEntry) -> Result<String, ApiError> {
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.bodies
            .get(&entry.name)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::Http {
                status: 404,
                message: "Not Found".to_string(),
            }))
    }

    async fn latest_commit_date(&self, path: &str) -> Result<CommitDate, ApiError> {
        self.commit_dates
            .get(path)
            .cloned()
            .unwrap_or(Ok(CommitDate::Unknown))
    }
}
