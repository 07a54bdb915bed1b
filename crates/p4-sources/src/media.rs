use async_trait::async_trait;
use p4_core::{Error, MediaItem, Result};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::handler::{HttpOptions, MediaSource, build_client};

/// Bodies accepted from the media endpoint: a bare array, or the
/// `{"success": true, "data": [...]}` envelope of `wp_send_json_success`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MediaPage {
    Items(Vec<MediaItem>),
    Envelope { data: Vec<MediaItem> },
}

pub(crate) fn parse_media_page(body: &str) -> Result<Vec<MediaItem>> {
    let page: MediaPage = serde_json::from_str(body)
        .map_err(|e| Error::Transient(format!("Malformed media listing: {}", e)))?;
    Ok(match page {
        MediaPage::Items(items) | MediaPage::Envelope { data: items } => items,
    })
}

/// Media source backed by the archive picker's ajax action.
pub struct HttpMediaSource {
    client: reqwest::Client,
    ajax_url: Url,
}

impl HttpMediaSource {
    pub fn new(ajax_url: &str, options: &HttpOptions) -> Result<Self> {
        let ajax_url = Url::parse(ajax_url)
            .map_err(|e| Error::InvalidInput(format!("Invalid ajax url {}: {}", ajax_url, e)))?;
        Ok(Self {
            client: build_client(options)?,
            ajax_url,
        })
    }

    pub fn url_for(&self, page: u32) -> Url {
        let mut url = self.ajax_url.clone();
        url.query_pairs_mut()
            .append_pair("action", "get_archive_images")
            .append_pair("page", &page.to_string());
        url
    }
}

#[async_trait]
impl MediaSource for HttpMediaSource {
    async fn fetch_media(&self, page: u32) -> Result<Vec<MediaItem>> {
        let url = self.url_for(page);
        debug!(%url, page, "fetching media page");

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

        parse_media_page(&body)
    }
}
