//! The story record shown in the gallery.

use serde::{Deserialize, Serialize};

/// Caption length the input form allows.
///
/// The store does not enforce this; it only drives the character counter
/// and the feed's title truncation.
pub const MAX_CONTENT_CHARS: usize = 300;

/// One gallery entry: an embedded image, a caption, and when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Self-contained `data:` URI for the image.
    pub image: String,

    /// Caption text, already trimmed.
    pub content: String,

    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

impl Story {
    /// Create a story, trimming the caption.
    pub fn new(image: impl Into<String>, content: &str, timestamp: i64) -> Self {
        Self {
            image: image.into(),
            content: content.trim().to_string(),
            timestamp,
        }
    }

    /// Number of characters in the caption.
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// MIME type declared by the data URI, if it is one.
    pub fn image_mime(&self) -> Option<&str> {
        let rest = self.image.strip_prefix("data:")?;
        let header = rest.split(',').next()?;
        let mime = header.split(';').next()?;
        if mime.is_empty() {
            None
        } else {
            Some(mime)
        }
    }
}

/// Truncate `text` to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_content() {
        let story = Story::new("data:image/png;base64,AAAA", "  hello world \n", 42);
        assert_eq!(story.content, "hello world");
        assert_eq!(story.timestamp, 42);
    }

    #[test]
    fn test_json_shape() {
        let story = Story::new("data:image/png;base64,AAAA", "caption", 1_700_000_000_000);
        let value = serde_json::to_value(&story).unwrap();
        assert_eq!(value["image"], "data:image/png;base64,AAAA");
        assert_eq!(value["content"], "caption");
        assert_eq!(value["timestamp"], 1_700_000_000_000i64);
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_image_mime() {
        let story = Story::new("data:image/jpeg;base64,/9j/", "x", 0);
        assert_eq!(story.image_mime(), Some("image/jpeg"));

        let remote = Story::new("https://example.com/a.png", "x", 0);
        assert_eq!(remote.image_mime(), None);
    }

    #[test]
    fn test_truncate_chars_unicode() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 300), "short");
    }
}
