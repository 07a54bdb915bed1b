//! Source traits for the listing and media endpoints

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use p4_core::{Error, MediaItem, Result, SortKey};

/// Options shared by the HTTP sources
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "p4/0.2 (planet4 search)".to_string(),
        }
    }
}

pub(crate) fn build_client(options: &HttpOptions) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(options.user_agent.as_str())
        .timeout(options.timeout)
        .build()
        .map_err(|e| Error::Other(anyhow::anyhow!("Failed to create HTTP client: {}", e)))
}

/// One page of the search listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub query: String,
    pub sort: SortKey,
    pub page: u32,
    /// Current location's query string without the leading `?`, decoded.
    pub query_string: String,
}

impl ListingRequest {
    pub fn new(query: &str, sort: SortKey, page: u32, query_string: impl Into<String>) -> Self {
        Self {
            query: query.trim().to_string(),
            sort,
            page,
            query_string: query_string.into(),
        }
    }

    /// Query parameters sent to the listing endpoint.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("action", "get_paged_posts".to_string()),
            ("search_query", self.query.clone()),
            ("paged", self.page.to_string()),
            ("orderby", self.sort.as_orderby().to_string()),
            ("query-string", self.query_string.clone()),
        ]
    }
}

/// Endpoint returning pre-rendered result markup, one page at a time
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the HTML fragment for exactly one page
    async fn fetch_page(&self, request: &ListingRequest) -> Result<String>;
}

/// Endpoint returning media records for the archive picker
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetch one page of media items (pages start at 1)
    async fn fetch_media(&self, page: u32) -> Result<Vec<MediaItem>>;
}

#[async_trait]
impl<T: ListingSource + ?Sized> ListingSource for Arc<T> {
    async fn fetch_page(&self, request: &ListingRequest) -> Result<String> {
        (**self).fetch_page(request).await
    }
}

#[async_trait]
impl<T: MediaSource + ?Sized> MediaSource for Arc<T> {
    async fn fetch_media(&self, page: u32) -> Result<Vec<MediaItem>> {
        (**self).fetch_media(page).await
    }
}
