//! Testing utilities.
//!
//! This module provides deterministic stand-ins for everything the
//! controller and ticker reach outside for:
//! - `FixedClock` and `TokioClock` for pinned or paused time
//! - `ScriptedConfirm` for scripted yes/no answers
//! - `RecordingNotifier` for asserting on user-facing messages
//! - `story()` / `png_file()` fixtures

use crate::clock::Clock;
use crate::controller::{Confirm, InputController, Notifier};
use crate::encode::SelectedFile;
use crate::storage::MemoryStorage;
use crate::store::StoryStore;
use crate::story::Story;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Smallest valid PNG header, enough for MIME sniffing.
pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// A clock pinned at the given epoch milliseconds.
    pub fn at_millis(millis: i64) -> Self {
        Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|g| *g).unwrap_or_default()
    }
}

/// A clock that follows tokio's (possibly paused) time from a fixed start.
#[derive(Debug)]
pub struct TokioClock {
    base: DateTime<Utc>,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.start.elapsed()).unwrap_or_default();
        self.base + elapsed
    }
}

/// Answers confirmations from a script; defaults once the script runs out.
#[derive(Debug)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    default: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            default: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always confirm.
    pub fn yes() -> Self {
        Self {
            default: true,
            ..Self::new([])
        }
    }

    /// Always cancel.
    pub fn no() -> Self {
        Self::new([])
    }

    /// Prompts seen so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut a| a.pop_front())
            .unwrap_or(self.default)
    }
}

/// Collects every alert.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.messages().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

/// A story with a tiny PNG image and the given caption.
pub fn story(content: &str) -> Story {
    story_at(content, 0)
}

/// A story with a specific timestamp.
pub fn story_at(content: &str, timestamp: i64) -> Story {
    Story::new(crate::encode::data_url("image/png", PNG_MAGIC), content, timestamp)
}

/// An in-memory PNG selection.
pub fn png_file(name: &str) -> SelectedFile {
    SelectedFile::from_bytes(name, PNG_MAGIC.to_vec())
}

/// A controller over in-memory storage, plus handles to its test doubles.
pub struct TestHarness {
    pub controller: Arc<InputController<MemoryStorage>>,
    pub notifier: Arc<RecordingNotifier>,
    pub confirm: Arc<ScriptedConfirm>,
    pub clock: Arc<FixedClock>,
}

impl TestHarness {
    /// Harness whose confirmations follow `confirm`.
    pub fn new(confirm: ScriptedConfirm) -> Self {
        Self::with_store(StoryStore::new(MemoryStorage::new()), confirm)
    }

    pub fn with_store(store: StoryStore<MemoryStorage>, confirm: ScriptedConfirm) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let confirm = Arc::new(confirm);
        let clock = Arc::new(FixedClock::at_millis(1_700_000_000_000));
        let controller = Arc::new(InputController::new(
            store,
            notifier.clone(),
            confirm.clone(),
            clock.clone(),
        ));

        Self {
            controller,
            notifier,
            confirm,
            clock,
        }
    }

    /// Fill the form and submit it.
    pub async fn submit(
        &self,
        file: Option<SelectedFile>,
        caption: &str,
    ) -> Result<Story, crate::controller::SubmitError> {
        self.controller.select_file(file);
        self.controller.set_caption(caption);
        self.controller.submit().await
    }
}
