//! In-memory sources, for offline runs and tests

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use p4_core::{Error, MediaItem, Result};
use tokio::sync::Mutex;

use crate::handler::{ListingRequest, ListingSource, MediaSource};

#[derive(Default)]
pub struct MemoryListingSource {
    pages: HashMap<u32, String>,
    latency: HashMap<u32, Duration>,
    failures: Mutex<HashSet<u32>>,
    requests: Mutex<Vec<ListingRequest>>,
}

impl MemoryListingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, html: impl Into<String>) -> Self {
        self.pages.insert(page, html.into());
        self
    }

    /// Delay the response for `page`.
    pub fn with_latency(mut self, page: u32, latency: Duration) -> Self {
        self.latency.insert(page, latency);
        self
    }

    /// Make the next fetch of `page` fail.
    pub async fn fail_once(&self, page: u32) {
        self.failures.lock().await.insert(page);
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<ListingRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ListingSource for MemoryListingSource {
    async fn fetch_page(&self, request: &ListingRequest) -> Result<String> {
        self.requests.lock().await.push(request.clone());

        if let Some(latency) = self.latency.get(&request.page) {
            tokio::time::sleep(*latency).await;
        }
        if self.failures.lock().await.remove(&request.page) {
            return Err(Error::Transient(format!(
                "Simulated failure for page {}",
                request.page
            )));
        }

        self.pages
            .get(&request.page)
            .cloned()
            .ok_or_else(|| Error::Transient(format!("HTTP error 404: page {}", request.page)))
    }
}

/// Media pages held in memory; page `n` is `pages[n - 1]`, later pages are empty.
#[derive(Default)]
pub struct MemoryMediaSource {
    pages: Vec<Vec<MediaItem>>,
    failures: Mutex<HashSet<u32>>,
}

impl MemoryMediaSource {
    pub fn new(pages: Vec<Vec<MediaItem>>) -> Self {
        Self {
            pages,
            failures: Mutex::new(HashSet::new()),
        }
    }

    pub async fn fail_once(&self, page: u32) {
        self.failures.lock().await.insert(page);
    }
}

#[async_trait]
impl MediaSource for MemoryMediaSource {
    async fn fetch_media(&self, page: u32) -> Result<Vec<MediaItem>> {
        if self.failures.lock().await.remove(&page) {
            return Err(Error::Transient(format!("Simulated failure for page {}", page)));
        }
        let index = page.checked_sub(1).map(|p| p as usize);
        Ok(index
            .and_then(|i| self.pages.get(i))
            .cloned()
            .unwrap_or_default())
    }
}
