//! Optional headline feed.
//!
//! Fetches top headlines and appends each one with an image as a story,
//! through the same append path user submissions take. Without a real API
//! key the feed does nothing.

use crate::clock::Clock;
use crate::controller::{InputController, SubmitError};
use crate::encode::{data_url, sniff_mime};
use crate::storage::KeyValueStorage;
use crate::story::{truncate_chars, Story, MAX_CONTENT_CHARS};
use async_trait::async_trait;
use headlines::{Headline, Headlines, ImageBytes};
use thiserror::Error;

/// Errors from pulling the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Headline fetch failed: {0}")]
    Fetch(#[from] headlines::Error),

    #[error("Failed to store headline: {0}")]
    Store(#[from] SubmitError),
}

/// Anything that can supply headlines and their images.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn top_headlines(&self) -> Result<Vec<Headline>, headlines::Error>;
    async fn fetch_image(&self, url: &str) -> Result<ImageBytes, headlines::Error>;
}

#[async_trait]
impl HeadlineSource for Headlines {
    async fn top_headlines(&self) -> Result<Vec<Headline>, headlines::Error> {
        Headlines::top_headlines(self).await
    }

    async fn fetch_image(&self, url: &str) -> Result<ImageBytes, headlines::Error> {
        Headlines::fetch_image(self, url).await
    }
}

/// What a pull did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedReport {
    pub added: usize,
    pub skipped: usize,
}

/// The headline producer.
pub struct HeadlineFeed {
    source: Option<Box<dyn HeadlineSource>>,
    limit: usize,
    max_image_bytes: u64,
}

impl HeadlineFeed {
    /// A feed that never produces anything.
    pub fn disabled() -> Self {
        Self {
            source: None,
            limit: 0,
            max_image_bytes: headlines::DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// A feed over any source, adding at most `limit` stories per pull.
    pub fn new(source: Box<dyn HeadlineSource>, limit: usize) -> Self {
        Self {
            source: Some(source),
            limit,
            max_image_bytes: headlines::DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Skip headline images larger than `limit` bytes.
    pub fn with_max_image_bytes(mut self, limit: u64) -> Self {
        self.max_image_bytes = limit;
        self
    }

    /// Build the feed from an API key; placeholder or missing keys disable it.
    pub fn from_api_key(api_key: Option<&str>, country: &str, limit: usize) -> Self {
        let Some(key) = api_key else {
            log::info!("headline feed disabled: NEWS_API_KEY not set");
            return Self::disabled();
        };

        match Headlines::new(key) {
            Ok(client) => {
                let client = client
                    .with_country(country)
                    .with_page_size(limit.max(1) as u32 * 2);
                Self::new(Box::new(client), limit)
            }
            Err(e) => {
                log::info!("headline feed disabled: {e}");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Fetch headlines and append them as stories.
    ///
    /// Headlines without images, or whose image fails to download or is
    /// larger than the image limit, are skipped. The first headline ends up
    /// first in the gallery.
    pub async fn pull_into<S: KeyValueStorage>(
        &self,
        controller: &InputController<S>,
        clock: &dyn Clock,
    ) -> Result<FeedReport, FeedError> {
        let Some(source) = &self.source else {
            return Ok(FeedReport::default());
        };

        let headlines = source.top_headlines().await?;
        let mut report = FeedReport::default();
        let mut stories = Vec::new();

        for headline in headlines {
            if stories.len() >= self.limit {
                break;
            }
            let Some(url) = headline.image_url.as_deref() else {
                report.skipped += 1;
                continue;
            };
            let fetched = source.fetch_image(url).await.and_then(|image| {
                let size = image.bytes.len() as u64;
                if size > self.max_image_bytes {
                    return Err(headlines::Error::TooLarge {
                        size,
                        limit: self.max_image_bytes,
                    });
                }
                Ok(image)
            });
            match fetched {
                Ok(image) => {
                    stories.push(headline_to_story(&headline, url, &image, clock.now().timestamp_millis()));
                }
                Err(e) => {
                    log::warn!("skipping headline '{}': {e}", headline.title);
                    report.skipped += 1;
                }
            }
        }

        // Appending pushes to the front, so go oldest-first
        for story in stories.into_iter().rev() {
            controller.append_story(story).await?;
            report.added += 1;
        }

        log::info!(
            "headline feed added {} stories ({} skipped)",
            report.added,
            report.skipped
        );
        Ok(report)
    }
}

/// Turn a headline and its downloaded image into a story.
pub fn headline_to_story(headline: &Headline, url: &str, image: &ImageBytes, timestamp: i64) -> Story {
    let mime = match image.content_type.as_deref() {
        Some(declared) if declared.starts_with("image/") => declared,
        _ => sniff_mime(&image.bytes, url),
    };
    let caption = truncate_chars(&headline.title, MAX_CONTENT_CHARS);
    Story::new(data_url(mime, &image.bytes), &caption, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headline(title: &str, image_url: Option<&str>) -> Headline {
        Headline {
            title: title.to_string(),
            image_url: image_url.map(str::to_string),
            source: None,
        }
    }

    #[test]
    fn test_headline_to_story_uses_declared_type() {
        let image = ImageBytes {
            content_type: Some("image/webp".to_string()),
            bytes: b"abc".to_vec(),
        };
        let story = headline_to_story(&headline("Title", None), "https://x/a.png", &image, 5);
        assert_eq!(story.image, "data:image/webp;base64,YWJj");
        assert_eq!(story.content, "Title");
        assert_eq!(story.timestamp, 5);
    }

    #[test]
    fn test_headline_to_story_sniffs_when_type_is_not_image() {
        let image = ImageBytes {
            content_type: Some("application/octet-stream".to_string()),
            bytes: b"abc".to_vec(),
        };
        let story = headline_to_story(&headline("Title", None), "https://x/a.jpg", &image, 0);
        assert!(story.image.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_long_titles_are_truncated() {
        let image = ImageBytes {
            content_type: None,
            bytes: Vec::new(),
        };
        let title = "x".repeat(400);
        let story = headline_to_story(&headline(&title, None), "u.png", &image, 0);
        assert_eq!(story.content_chars(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_placeholder_key_disables_feed() {
        assert!(!HeadlineFeed::from_api_key(None, "us", 5).is_enabled());
        assert!(!HeadlineFeed::from_api_key(Some("YOUR_API_KEY"), "us", 5).is_enabled());
        assert!(!HeadlineFeed::disabled().is_enabled());
    }
}
