use async_trait::async_trait;
use p4_core::{Error, Result};
use reqwest::Url;
use tracing::debug;

use crate::handler::{HttpOptions, ListingRequest, ListingSource, build_client};

/// Decoded query string of a page location, without the leading `?`.
pub fn location_query(location: &str) -> Result<String> {
    let url = Url::parse(location)
        .map_err(|e| Error::InvalidInput(format!("Invalid location {}: {}", location, e)))?;
    Ok(url
        .query_pairs()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&"))
}

/// Listing source backed by the site's admin-ajax endpoint.
pub struct HttpListingSource {
    client: reqwest::Client,
    ajax_url: Url,
}

impl HttpListingSource {
    pub fn new(ajax_url: &str, options: &HttpOptions) -> Result<Self> {
        let ajax_url = Url::parse(ajax_url)
            .map_err(|e| Error::InvalidInput(format!("Invalid ajax url {}: {}", ajax_url, e)))?;
        if !matches!(ajax_url.scheme(), "http" | "https") {
            return Err(Error::InvalidInput(format!(
                "Ajax url must be http or https: {}",
                ajax_url
            )));
        }
        Ok(Self {
            client: build_client(options)?,
            ajax_url,
        })
    }

    pub fn url_for(&self, request: &ListingRequest) -> Url {
        let mut url = self.ajax_url.clone();
        url.query_pairs_mut().extend_pairs(request.params());
        url
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_page(&self, request: &ListingRequest) -> Result<String> {
        let url = self.url_for(request);
        debug!(%url, page = request.page, "fetching listing page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Transient(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Transient(format!(
                "HTTP error {}: {}",
                response.status().as_u16(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transient(format!("Failed to read response: {}", e)))?;

        // admin-ajax answers "0" or "-1" when the action is unknown.
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "0" || trimmed == "-1" {
            return Err(Error::Transient(format!(
                "Empty listing body for page {}",
                request.page
            )));
        }

        Ok(body)
    }
}
