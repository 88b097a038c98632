//! Headline feed tests against a scripted source.

use async_trait::async_trait;
use headlines::{Error, Headline, ImageBytes};
use storyboard_core::feed::HeadlineSource;
use storyboard_core::testing::story;
use storyboard_core::{FeedError, HeadlineFeed, ScriptedConfirm, TestHarness};

struct ScriptedSource {
    headlines: Vec<Headline>,
    fail_listing: bool,
}

impl ScriptedSource {
    fn new(titles: &[(&str, Option<&str>)]) -> Self {
        Self {
            headlines: titles
                .iter()
                .map(|(title, url)| Headline {
                    title: title.to_string(),
                    image_url: url.map(str::to_string),
                    source: Some("Wire".to_string()),
                })
                .collect(),
            fail_listing: false,
        }
    }
}

#[async_trait]
impl HeadlineSource for ScriptedSource {
    async fn top_headlines(&self) -> Result<Vec<Headline>, Error> {
        if self.fail_listing {
            return Err(Error::Api {
                status: 401,
                message: "apiKeyInvalid".to_string(),
            });
        }
        Ok(self.headlines.clone())
    }

    async fn fetch_image(&self, url: &str) -> Result<ImageBytes, Error> {
        if url.contains("broken") {
            return Err(Error::Network("connection reset".to_string()));
        }
        if url.contains("poster") {
            return Ok(ImageBytes {
                content_type: Some("image/jpeg".to_string()),
                bytes: vec![0u8; 4096],
            });
        }
        Ok(ImageBytes {
            content_type: Some("image/jpeg".to_string()),
            bytes: url.as_bytes().to_vec(),
        })
    }
}

async fn captions(harness: &TestHarness) -> Vec<String> {
    harness
        .controller
        .stories()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.content)
        .collect()
}

#[tokio::test]
async fn test_pull_appends_headlines_with_images_in_order() {
    let harness = TestHarness::new(ScriptedConfirm::no());
    harness.controller.append_story(story("mine")).await.unwrap();

    let source = ScriptedSource::new(&[
        ("First", Some("https://img/1.jpg")),
        ("No picture", None),
        ("Second", Some("https://img/broken.jpg")),
        ("Third", Some("https://img/3.jpg")),
    ]);
    let feed = HeadlineFeed::new(Box::new(source), 5);

    let report = feed
        .pull_into(&harness.controller, harness.clock.as_ref())
        .await
        .unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(captions(&harness).await, ["First", "Third", "mine"]);

    let stories = harness.controller.stories().await.unwrap();
    assert!(stories[0].image.starts_with("data:image/jpeg;base64,"));
    assert_eq!(stories[0].timestamp, 1_700_000_000_000);
}

#[tokio::test]
async fn test_pull_respects_limit_and_capacity() {
    let harness = TestHarness::new(ScriptedConfirm::no());
    let titles: Vec<(String, String)> = (0..8)
        .map(|i| (format!("H{i}"), format!("https://img/{i}.jpg")))
        .collect();
    let refs: Vec<(&str, Option<&str>)> = titles
        .iter()
        .map(|(t, u)| (t.as_str(), Some(u.as_str())))
        .collect();

    let feed = HeadlineFeed::new(Box::new(ScriptedSource::new(&refs)), 7);
    let report = feed
        .pull_into(&harness.controller, harness.clock.as_ref())
        .await
        .unwrap();

    assert_eq!(report.added, 7);
    // The store still holds only the newest five, first headline on top
    assert_eq!(captions(&harness).await, ["H0", "H1", "H2", "H3", "H4"]);
}

#[tokio::test]
async fn test_listing_failure_leaves_store_alone() {
    let harness = TestHarness::new(ScriptedConfirm::no());
    harness.controller.append_story(story("mine")).await.unwrap();

    let mut source = ScriptedSource::new(&[("First", Some("https://img/1.jpg"))]);
    source.fail_listing = true;
    let feed = HeadlineFeed::new(Box::new(source), 5);

    let result = feed
        .pull_into(&harness.controller, harness.clock.as_ref())
        .await;

    assert!(matches!(result, Err(FeedError::Fetch(Error::Api { status: 401, .. }))));
    assert_eq!(captions(&harness).await, ["mine"]);
}

#[tokio::test]
async fn test_disabled_feed_is_a_no_op() {
    let harness = TestHarness::new(ScriptedConfirm::no());
    let feed = HeadlineFeed::from_api_key(Some("YOUR_API_KEY"), "us", 5);

    let report = feed
        .pull_into(&harness.controller, harness.clock.as_ref())
        .await
        .unwrap();

    assert_eq!(report.added, 0);
    assert!(captions(&harness).await.is_empty());
}

#[tokio::test]
async fn test_oversized_images_are_skipped() {
    let harness = TestHarness::new(ScriptedConfirm::no());
    let source = ScriptedSource::new(&[
        ("Huge", Some("https://img/poster.jpg")),
        ("Small", Some("https://img/1.jpg")),
    ]);
    let feed = HeadlineFeed::new(Box::new(source), 5).with_max_image_bytes(1024);

    let report = feed
        .pull_into(&harness.controller, harness.clock.as_ref())
        .await
        .unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(captions(&harness).await, ["Small"]);
}
