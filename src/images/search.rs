//! Google Custom Search image provider.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    config::{SearchCredentials, SourceConfig},
    error::{FetchError, Result},
    images::{ImageAsset, ImageProvider},
};

/// Results per request allowed by the search API
const PAGE_SIZE: usize = 10;

/// The API refuses to page past the hundredth result
const MAX_RESULTS: usize = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
}

/// Production provider backed by the Custom Search JSON API
pub struct GoogleImageSearch {
    credentials: SearchCredentials,
    endpoint: String,
    safe_search: String,
    image_size: String,
    client: Client,
}

impl GoogleImageSearch {
    pub fn new(credentials: SearchCredentials, sources: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(sources.request_timeout())
            .user_agent(concat!("image-reel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            credentials,
            endpoint: sources.search_endpoint.clone(),
            safe_search: sources.safe_search.clone(),
            image_size: sources.image_size.clone(),
            client,
        })
    }

    /// Collect result links page by page until `wanted` links are found or
    /// the API runs out of results.
    async fn search(&self, keywords: &str, wanted: usize) -> Result<Vec<SearchItem>> {
        let mut items = Vec::with_capacity(wanted);

        while items.len() < wanted {
            let start = items.len() + 1;
            let num = (wanted - items.len()).min(PAGE_SIZE);

            let page = self.search_page(keywords, start, num).await?;
            let received = page.len();
            debug!("Search page starting at {} returned {} items", start, received);

            items.extend(page);
            if received < num {
                break;
            }
        }

        items.truncate(wanted);
        Ok(items)
    }

    async fn search_page(&self, keywords: &str, start: usize, num: usize) -> Result<Vec<SearchItem>> {
        let num = num.to_string();
        let start = start.to_string();
        let params = [
            ("key", self.credentials.api_key.as_str()),
            ("cx", self.credentials.cx.as_str()),
            ("q", keywords),
            ("searchType", "image"),
            ("num", num.as_str()),
            ("start", start.as_str()),
            ("safe", self.safe_search.as_str()),
            ("imgSize", self.image_size.as_str()),
        ];

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                reason: format!("search request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body).into());
        }

        let body = response.text().await.map_err(|e| FetchError::Network {
            reason: format!("failed to read search response: {}", e),
        })?;

        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| FetchError::InvalidResponse {
            reason: e.to_string(),
        })?;

        Ok(parsed.items)
    }

    async fn download(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

/// Map a non-success search status to the error taxonomy.
///
/// The API answers an invalid key with 400 rather than 401, so the body is
/// inspected for that case.
fn classify_status(status: StatusCode, body: &str) -> FetchError {
    let reason = format!("HTTP {}: {}", status, body.trim());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Authentication { reason },
        StatusCode::BAD_REQUEST if body.contains("API key not valid") => FetchError::Authentication { reason },
        _ => FetchError::Network { reason },
    }
}

#[async_trait]
impl ImageProvider for GoogleImageSearch {
    fn name(&self) -> &str {
        "google-image-search"
    }

    async fn fetch(&self, keywords: &str, max_images: usize) -> Result<Vec<ImageAsset>> {
        info!("Searching for '{}'...", keywords);

        let wanted = if max_images > MAX_RESULTS {
            warn!("Image search is limited to {} results, requested {}", MAX_RESULTS, max_images);
            MAX_RESULTS
        } else {
            max_images
        };

        let items = self.search(keywords, wanted).await?;
        if items.is_empty() {
            return Err(FetchError::EmptyResult { query: keywords.to_string() }.into());
        }

        let mut assets = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            debug!("   {}. {} ({})", index + 1, item.title, item.link);

            match self.download(&item.link).await {
                Ok(bytes) => assets.push(ImageAsset::from_bytes(bytes, index, item.link.clone())),
                Err(reason) => warn!("Skipping image {}: download failed: {}", item.link, reason),
            }
        }

        if assets.is_empty() {
            return Err(FetchError::Network {
                reason: format!("none of the {} image downloads succeeded", items.len()),
            }
            .into());
        }

        info!("Fetched {} of {} images", assets.len(), items.len());
        Ok(assets)
    }
}
