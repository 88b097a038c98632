//! Bounded, newest-first story store.
//!
//! Every mutation reads the whole persisted sequence, changes it, and writes
//! the whole sequence back under a single key.

use crate::storage::{KeyValueStorage, StorageError};
use crate::story::Story;
use thiserror::Error;

/// Storage key used by the original widget.
pub const DEFAULT_STORAGE_KEY: &str = "td5_stories";

/// Maximum number of stories kept.
pub const DEFAULT_CAPACITY: usize = 5;

/// Errors from story store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Stored stories are malformed: {0}")]
    Read(#[source] serde_json::Error),

    #[error("Failed to read stored stories: {0}")]
    Load(#[source] StorageError),

    #[error("Failed to save stories: {0}")]
    Write(#[source] StorageError),

    #[error("Failed to serialize stories: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("No story at position {index} (store holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Where and how many stories are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Storage key holding the serialized sequence.
    pub key: String,

    /// Upper bound on stored stories.
    pub capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl StoreConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Set the capacity bound. A capacity of zero is raised to one.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }
}

/// Handle over a storage backend holding a bounded story sequence.
#[derive(Debug)]
pub struct StoryStore<S> {
    storage: S,
    config: StoreConfig,
}

impl<S: KeyValueStorage> StoryStore<S> {
    /// Create a store with the default key and capacity.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, StoreConfig::default())
    }

    /// Create a store with an explicit key and capacity.
    pub fn with_config(storage: S, config: StoreConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Read every stored story, newest first.
    ///
    /// An absent key reads as empty; malformed data is an error.
    pub async fn read_all(&self) -> Result<Vec<Story>, StoreError> {
        match self.storage.get(&self.config.key).await.map_err(StoreError::Load)? {
            Some(raw) => serde_json::from_str(&raw).map_err(StoreError::Read),
            None => Ok(Vec::new()),
        }
    }

    /// Number of stored stories.
    pub async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read_all().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    /// Insert `story` at the front, evicting the oldest past capacity.
    ///
    /// Returns whatever was evicted, oldest last.
    pub async fn append(&mut self, story: Story) -> Result<Vec<Story>, StoreError> {
        let mut stories = self.read_all().await?;
        stories.insert(0, story);

        let evicted = if stories.len() > self.config.capacity {
            stories.split_off(self.config.capacity)
        } else {
            Vec::new()
        };

        self.write_all(&stories).await?;
        log::debug!(
            "appended story under '{}' ({} stored, {} evicted)",
            self.config.key,
            stories.len(),
            evicted.len()
        );
        Ok(evicted)
    }

    /// Remove the story at `index`, keeping the others in order.
    pub async fn delete_at(&mut self, index: usize) -> Result<Story, StoreError> {
        let mut stories = self.read_all().await?;
        if index >= stories.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: stories.len(),
            });
        }

        let removed = stories.remove(index);
        self.write_all(&stories).await?;
        log::debug!(
            "deleted story {index} under '{}' ({} left)",
            self.config.key,
            stories.len()
        );
        Ok(removed)
    }

    /// Remove the persisted value entirely.
    pub async fn clear(&mut self) -> Result<(), StoreError> {
        self.storage
            .remove(&self.config.key)
            .await
            .map_err(StoreError::Write)?;
        log::debug!("cleared stories under '{}'", self.config.key);
        Ok(())
    }

    async fn write_all(&mut self, stories: &[Story]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(stories).map_err(StoreError::Serialize)?;
        self.storage
            .set(&self.config.key, &raw)
            .await
            .map_err(StoreError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn story(name: &str) -> Story {
        Story::new(format!("data:image/png;base64,{name}"), name, 0)
    }

    async fn contents(store: &StoryStore<MemoryStorage>) -> Vec<String> {
        store
            .read_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.content)
            .collect()
    }

    #[tokio::test]
    async fn test_empty_when_nothing_persisted() {
        let store = StoryStore::new(MemoryStorage::new());
        assert!(store.read_all().await.unwrap().is_empty());
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_length_tracks_min_n_capacity() {
        let mut store = StoryStore::new(MemoryStorage::new());
        for n in 1..=12 {
            let name = format!("s{n}");
            store.append(story(&name)).await.unwrap();
            let stored = store.read_all().await.unwrap();
            assert_eq!(stored.len(), n.min(DEFAULT_CAPACITY));
            assert_eq!(stored[0].content, name);
        }
    }

    #[tokio::test]
    async fn test_append_evicts_oldest() {
        let mut store = StoryStore::new(MemoryStorage::new());
        for name in ["A", "B", "C", "D", "E"] {
            assert!(store.append(story(name)).await.unwrap().is_empty());
        }

        let evicted = store.append(story("F")).await.unwrap();
        assert_eq!(evicted, vec![story("A")]);
        assert_eq!(contents(&store).await, ["F", "E", "D", "C", "B"]);
    }

    #[tokio::test]
    async fn test_delete_preserves_order() {
        let mut store = StoryStore::new(MemoryStorage::new());
        for name in ["A", "B", "C", "D", "E"] {
            store.append(story(name)).await.unwrap();
        }
        // [E, D, C, B, A]
        let removed = store.delete_at(2).await.unwrap();
        assert_eq!(removed.content, "C");
        assert_eq!(contents(&store).await, ["E", "D", "B", "A"]);
    }

    #[tokio::test]
    async fn test_delete_out_of_range_writes_nothing() {
        let mut store = StoryStore::new(MemoryStorage::new());
        store.append(story("A")).await.unwrap();

        match store.delete_at(1).await {
            Err(StoreError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 1);
                assert_eq!(len, 1);
            }
            other => panic!("expected out of range, got {other:?}"),
        }
        assert_eq!(contents(&store).await, ["A"]);
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let mut store = StoryStore::new(MemoryStorage::new());
        store.append(story("A")).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.read_all().await.unwrap().is_empty());
        assert_eq!(store.storage().get(DEFAULT_STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_blob_is_an_error() {
        let mut storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, "{not json").await.unwrap();
        let store = StoryStore::new(storage);

        assert!(matches!(store.read_all().await, Err(StoreError::Read(_))));
    }

    #[tokio::test]
    async fn test_reads_blob_written_by_browser_widget() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"[{"image":"data:image/png;base64,AA==","content":"hi","timestamp":1700000000000}]"#,
            )
            .await
            .unwrap();
        let store = StoryStore::new(storage);

        let stories = store.read_all().await.unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].timestamp, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_custom_key_and_capacity_are_independent() {
        let mut small = StoryStore::with_config(
            MemoryStorage::new(),
            StoreConfig::new("other").with_capacity(2),
        );
        for name in ["A", "B", "C"] {
            small.append(story(name)).await.unwrap();
        }
        assert_eq!(contents(&small).await, ["C", "B"]);
        assert_eq!(small.storage().get(DEFAULT_STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quota_failure_leaves_previous_blob() {
        let mut store = StoryStore::new(MemoryStorage::new().with_quota(200));
        store.append(story("A")).await.unwrap();

        let huge = Story::new(format!("data:image/png;base64,{}", "A".repeat(500)), "big", 0);
        assert!(matches!(
            store.append(huge).await,
            Err(StoreError::Write(StorageError::QuotaExceeded { .. }))
        ));
        assert_eq!(contents(&store).await, ["A"]);
    }
}
