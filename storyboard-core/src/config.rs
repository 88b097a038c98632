//! Runtime configuration.
//!
//! Values come from defaults, then the environment (a `.env` file is loaded
//! if present), then whatever the caller sets explicitly with `with_*`.

use crate::controller::{CounterStyle, DEFAULT_MAX_IMAGE_BYTES};
use crate::storage::{FileStorage, StorageError};
use crate::store::{StoreConfig, StoryStore, DEFAULT_CAPACITY, DEFAULT_STORAGE_KEY};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Directory used when nothing else is configured.
pub const DEFAULT_DIR: &str = ".storyboard";

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Everything needed to assemble the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryboardConfig {
    /// Directory for the file-backed storage.
    pub storage_dir: PathBuf,

    /// Storage key for the story sequence.
    pub storage_key: String,

    /// Maximum number of stories kept.
    pub capacity: usize,

    /// Largest accepted image, in bytes.
    pub max_image_bytes: u64,

    /// Character counter presentation.
    pub counter_style: CounterStyle,

    /// Headline feed API key. `None` disables the feed.
    pub news_api_key: Option<String>,

    /// Country code for headlines.
    pub news_country: String,
}

impl Default for StoryboardConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            capacity: DEFAULT_CAPACITY,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            counter_style: CounterStyle::Rich,
            news_api_key: None,
            news_country: "us".to_string(),
        }
    }
}

impl StoryboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `.env` if present and read `STORYBOARD_*` / `NEWS_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = lookup("STORYBOARD_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("STORYBOARD_KEY") {
            config.storage_key = key;
        }
        if let Some(value) = lookup("STORYBOARD_CAPACITY") {
            config.capacity = parse_var("STORYBOARD_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("STORYBOARD_MAX_IMAGE_BYTES") {
            config.max_image_bytes = parse_var("STORYBOARD_MAX_IMAGE_BYTES", &value)?;
        }
        if let Some(value) = lookup("STORYBOARD_COUNTER") {
            config.counter_style = parse_counter_style(&value).ok_or(ConfigError::InvalidValue {
                var: "STORYBOARD_COUNTER",
                value,
            })?;
        }
        config.news_api_key = lookup("NEWS_API_KEY").filter(|k| !k.trim().is_empty());
        if let Some(country) = lookup("NEWS_COUNTRY") {
            config.news_country = country;
        }

        if config.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                var: "STORYBOARD_CAPACITY",
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_max_image_bytes(mut self, limit: u64) -> Self {
        self.max_image_bytes = limit;
        self
    }

    pub fn with_counter_style(mut self, style: CounterStyle) -> Self {
        self.counter_style = style;
        self
    }

    pub fn with_news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Store settings derived from this config.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.storage_key.clone()).with_capacity(self.capacity)
    }

    /// Open the file-backed story store.
    pub async fn open_store(&self) -> Result<StoryStore<FileStorage>, StorageError> {
        let storage = FileStorage::open(&self.storage_dir).await?;
        Ok(StoryStore::with_config(storage, self.store_config()))
    }
}

/// Parse `rich` / `minimal` (case-insensitive).
pub fn parse_counter_style(value: &str) -> Option<CounterStyle> {
    match value.trim().to_lowercase().as_str() {
        "rich" | "full" => Some(CounterStyle::Rich),
        "minimal" | "bare" => Some(CounterStyle::Minimal),
        _ => None,
    }
}

fn parse_var<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoryboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoryboardConfig::default());
        assert_eq!(config.storage_key, "td5_stories");
        assert_eq!(config.capacity, 5);
        assert_eq!(config.max_image_bytes, 20 * 1024 * 1024);
        assert_eq!(config.news_api_key, None);
    }

    #[test]
    fn test_env_overrides() {
        let config = StoryboardConfig::from_lookup(lookup(&[
            ("STORYBOARD_DIR", "/tmp/stories"),
            ("STORYBOARD_KEY", "mine"),
            ("STORYBOARD_CAPACITY", "8"),
            ("STORYBOARD_MAX_IMAGE_BYTES", "1024"),
            ("STORYBOARD_COUNTER", "Minimal"),
            ("NEWS_API_KEY", "abc"),
            ("NEWS_COUNTRY", "in"),
        ]))
        .unwrap();

        assert_eq!(config.storage_dir, PathBuf::from("/tmp/stories"));
        assert_eq!(config.store_config(), StoreConfig::new("mine").with_capacity(8));
        assert_eq!(config.max_image_bytes, 1024);
        assert_eq!(config.counter_style, CounterStyle::Minimal);
        assert_eq!(config.news_api_key.as_deref(), Some("abc"));
        assert_eq!(config.news_country, "in");
    }

    #[test]
    fn test_invalid_values() {
        assert!(StoryboardConfig::from_lookup(lookup(&[("STORYBOARD_CAPACITY", "lots")])).is_err());
        assert!(StoryboardConfig::from_lookup(lookup(&[("STORYBOARD_CAPACITY", "0")])).is_err());
        assert!(StoryboardConfig::from_lookup(lookup(&[("STORYBOARD_COUNTER", "fancy")])).is_err());
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = StoryboardConfig::from_lookup(lookup(&[("NEWS_API_KEY", "  ")])).unwrap();
        assert_eq!(config.news_api_key, None);
    }
}
