//! Minimal client for NewsAPI-style headline endpoints.
//!
//! This crate provides:
//! - Fetching top headlines for a country
//! - Downloading the image attached to a headline
//! - Placeholder-credential detection so callers can treat the feed as disabled

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://newsapi.org/v2";
const DEFAULT_COUNTRY: &str = "us";
const DEFAULT_PAGE_SIZE: u32 = 5;

/// Largest image download accepted by default (20 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Value shipped in sample configuration files in place of a real key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// Errors that can occur when using the headlines client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Image too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
}

/// Returns true when `key` is empty or still the shipped placeholder.
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || key == PLACEHOLDER_API_KEY
}

/// Headlines API client.
#[derive(Clone)]
pub struct Headlines {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    country: String,
    page_size: u32,
    max_image_bytes: u64,
}

impl Headlines {
    /// Create a new client with the given API key.
    ///
    /// Fails with [`Error::NoApiKey`] when the key is unset or the placeholder.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into();
        if is_placeholder_key(&api_key) {
            return Err(Error::NoApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: API_BASE.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        })
    }

    /// Create a client from the NEWS_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("NEWS_API_KEY").map_err(|_| Error::NoApiKey)?;
        Self::new(api_key)
    }

    /// Set the country code used for top headlines.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Set how many headlines a single fetch asks for.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Cap the size of a single image download.
    pub fn with_max_image_bytes(mut self, limit: u64) -> Self {
        self.max_image_bytes = limit;
        self
    }

    /// Point the client at a different API root (e.g. a self-hosted mirror).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the top-headlines request for the configured country and page size.
    pub fn top_headlines_request(&self) -> Result<reqwest::RequestBuilder, Error> {
        let page_size = self.page_size.to_string();
        Ok(self
            .client
            .get(format!("{}/top-headlines", self.base_url))
            .query(&[("country", self.country.as_str()), ("pageSize", page_size.as_str())])
            .headers(self.build_headers()?))
    }

    /// Fetch the current top headlines.
    pub async fn top_headlines(&self) -> Result<Vec<Headline>, Error> {
        let response = self
            .top_headlines_request()?
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let headlines = parse_top_headlines(&body)?;
        log::debug!("fetched {} headlines", headlines.len());
        Ok(headlines)
    }

    /// Download the image behind a headline.
    ///
    /// Bodies over the configured limit fail with [`Error::TooLarge`], either
    /// up front from `Content-Length` or as soon as the streamed bytes pass it.
    pub async fn fetch_image(&self, url: &str) -> Result<ImageBytes, Error> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Api {
                status: response.status().as_u16(),
                message: format!("image download failed for {url}"),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let limit = self.max_image_bytes;
        if let Some(size) = response.content_length().filter(|&size| size > limit) {
            return Err(Error::TooLarge { size, limit });
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
        {
            check_image_size(bytes.len() + chunk.len(), limit)?;
            bytes.extend_from_slice(&chunk);
        }

        Ok(ImageBytes {
            content_type,
            bytes,
        })
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

fn check_image_size(size: usize, limit: u64) -> Result<(), Error> {
    let size = size as u64;
    if size > limit {
        return Err(Error::TooLarge { size, limit });
    }
    Ok(())
}

/// A single headline with its optional image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub image_url: Option<String>,
    pub source: Option<String>,
}

/// Raw bytes of a downloaded image plus the server's declared type.
#[derive(Debug, Clone)]
pub struct ImageBytes {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// ============================================================================
// API Types (internal)
// ============================================================================

#[derive(Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url_to_image: Option<String>,
    #[serde(default)]
    source: Option<ApiSource>,
}

#[derive(Deserialize)]
struct ApiSource {
    #[serde(default)]
    name: Option<String>,
}

/// Parse a top-headlines response body.
///
/// Articles without a title are skipped.
pub fn parse_top_headlines(body: &str) -> Result<Vec<Headline>, Error> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;

    if response.status != "ok" {
        return Err(Error::Api {
            status: 200,
            message: response
                .message
                .unwrap_or_else(|| format!("status {}", response.status)),
        });
    }

    Ok(response
        .articles
        .into_iter()
        .filter_map(|a| {
            let title = a.title?.trim().to_string();
            if title.is_empty() {
                return None;
            }
            Some(Headline {
                title,
                image_url: a.url_to_image.filter(|u| !u.trim().is_empty()),
                source: a.source.and_then(|s| s.name),
            })
        })
        .collect())
}
