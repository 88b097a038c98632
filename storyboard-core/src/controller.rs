//! Input controller.
//!
//! Validates the submission form, encodes the selected image, commits the
//! story to the store, and republishes the gallery view. Submission progress
//! is a small state machine published on a watch channel:
//!
//! ```text
//! Idle -> Validating -> Encoding -> Committing -> Idle
//! Idle -> Validating -> Rejected -> Idle
//! ```
//!
//! Only one submission may be in flight. A second `submit` while one is
//! running fails with [`SubmitError::Busy`] without touching anything.

use crate::clock::Clock;
use crate::encode::{encode_data_url, EncodeError, SelectedFile};
use crate::render::{render, GalleryView};
use crate::storage::KeyValueStorage;
use crate::store::{StoreError, StoryStore};
use crate::story::{Story, MAX_CONTENT_CHARS};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex};

/// One mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Largest image accepted by default (20 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 20 * MIB;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this story?";
pub const CLEAR_PROMPT: &str =
    "Are you sure you want to delete ALL stories? This action cannot be undone.";
pub const ADDED_MESSAGE: &str = "Story added successfully!";
pub const CLEARED_MESSAGE: &str = "All stories have been cleared.";

/// Everything that can go wrong at the controller boundary.
///
/// The display strings are the user-facing messages.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please select an image file.")]
    MissingImage,

    #[error("Image size exceeds {}MB limit. Please choose a smaller file.", .limit / MIB)]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Please enter story content.")]
    MissingContent,

    #[error("Error adding story: {0}")]
    EncodingFailed(#[from] EncodeError),

    #[error("Error loading stories: {0}")]
    StorageReadFailure(#[source] StoreError),

    #[error("Error saving stories: {0}")]
    StorageWriteFailure(#[source] StoreError),

    #[error("A story is already being added. Please wait.")]
    Busy,

    #[error("That story no longer exists.")]
    InvalidIndex { index: usize, len: usize },
}

impl From<StoreError> for SubmitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::IndexOutOfRange { index, len } => SubmitError::InvalidIndex { index, len },
            StoreError::Read(_) | StoreError::Load(_) => SubmitError::StorageReadFailure(err),
            StoreError::Write(_) | StoreError::Serialize(_) => {
                SubmitError::StorageWriteFailure(err)
            }
        }
    }
}

/// Where a submission attempt is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Encoding,
    Committing,
    Rejected,
}

impl SubmissionState {
    /// Whether a submission currently holds the in-flight slot.
    pub fn is_busy(self) -> bool {
        !matches!(self, SubmissionState::Idle)
    }

    /// Label for the submit control.
    pub fn submit_label(self) -> &'static str {
        match self {
            SubmissionState::Encoding | SubmissionState::Committing => "Adding Story...",
            _ => "Add Story",
        }
    }
}

/// How the caption counter is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterStyle {
    /// `"<n>/300 characters"`
    #[default]
    Rich,
    /// `"<n>"`
    Minimal,
}

/// Text for the live character counter.
pub fn counter_text(caption: &str, style: CounterStyle) -> String {
    let count = caption.chars().count();
    match style {
        CounterStyle::Rich => format!("{count}/{MAX_CONTENT_CHARS} characters"),
        CounterStyle::Minimal => count.to_string(),
    }
}

/// The input fields of the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    pub file: Option<SelectedFile>,
    pub caption: String,
}

/// Check the form without side effects. Returns the file and trimmed caption.
pub fn validate(form: &SubmissionForm, max_image_bytes: u64) -> Result<(&SelectedFile, String), SubmitError> {
    let file = form.file.as_ref().ok_or(SubmitError::MissingImage)?;
    if file.size > max_image_bytes {
        return Err(SubmitError::FileTooLarge {
            size: file.size,
            limit: max_image_bytes,
        });
    }

    let content = form.caption.trim();
    if content.is_empty() {
        return Err(SubmitError::MissingContent);
    }

    Ok((file, content.to_string()))
}

/// Shows blocking, user-facing messages.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Result of a confirmable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    Cancelled,
}

/// Holds the in-flight slot; dropping it always returns the state to Idle.
struct InFlight<'a> {
    state: &'a watch::Sender<SubmissionState>,
}

impl<'a> InFlight<'a> {
    fn acquire(state: &'a watch::Sender<SubmissionState>) -> Result<Self, SubmitError> {
        let acquired = state.send_if_modified(|current| {
            if current.is_busy() {
                false
            } else {
                *current = SubmissionState::Validating;
                true
            }
        });

        if acquired {
            Ok(Self { state })
        } else {
            Err(SubmitError::Busy)
        }
    }

    fn advance(&self, next: SubmissionState) {
        self.state.send_replace(next);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.send_replace(SubmissionState::Idle);
    }
}

/// Drives the store and the gallery view from user actions.
pub struct InputController<S> {
    store: Mutex<StoryStore<S>>,
    state: watch::Sender<SubmissionState>,
    form: watch::Sender<SubmissionForm>,
    view: watch::Sender<GalleryView>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    clock: Arc<dyn Clock>,
    max_image_bytes: u64,
    counter_style: CounterStyle,
}

impl<S: KeyValueStorage> InputController<S> {
    pub fn new(
        store: StoryStore<S>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            state: watch::Sender::new(SubmissionState::Idle),
            form: watch::Sender::new(SubmissionForm::default()),
            view: watch::Sender::new(render(&[])),
            notifier,
            confirm,
            clock,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            counter_style: CounterStyle::default(),
        }
    }

    /// Override the image size limit.
    pub fn with_max_image_bytes(mut self, limit: u64) -> Self {
        self.max_image_bytes = limit;
        self
    }

    pub fn with_counter_style(mut self, style: CounterStyle) -> Self {
        self.counter_style = style;
        self
    }

    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_bytes
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn state(&self) -> SubmissionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// The most recently rendered gallery.
    pub fn view(&self) -> GalleryView {
        self.view.borrow().clone()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<GalleryView> {
        self.view.subscribe()
    }

    pub fn form(&self) -> SubmissionForm {
        self.form.borrow().clone()
    }

    pub fn counter_text(&self) -> String {
        counter_text(&self.form.borrow().caption, self.counter_style)
    }

    // =========================================================================
    // Form editing
    // =========================================================================

    /// Set or clear the selected image.
    pub fn select_file(&self, file: Option<SelectedFile>) {
        self.form.send_modify(|form| form.file = file);
    }

    /// Replace the caption text.
    pub fn set_caption(&self, caption: impl Into<String>) {
        let caption = caption.into();
        self.form.send_modify(|form| form.caption = caption);
    }

    /// Edit the caption in place.
    pub fn edit_caption(&self, edit: impl FnOnce(&mut String)) {
        self.form.send_modify(|form| edit(&mut form.caption));
    }

    pub fn reset_form(&self) {
        self.form.send_replace(SubmissionForm::default());
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Re-read the store and republish the gallery.
    pub async fn refresh(&self) -> Result<GalleryView, SubmitError> {
        let result = self.rerender(&*self.store.lock().await).await;
        if let Err(e) = &result {
            self.notifier.alert(&e.to_string());
        }
        result
    }

    /// Submit the current form.
    pub async fn submit(&self) -> Result<Story, SubmitError> {
        let result = match InFlight::acquire(&self.state) {
            Ok(guard) => self.run_submission(&guard).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => self.notifier.alert(ADDED_MESSAGE),
            Err(e) => {
                log::warn!("submission failed: {e}");
                self.notifier.alert(&e.to_string());
            }
        }
        result
    }

    async fn run_submission(&self, guard: &InFlight<'_>) -> Result<Story, SubmitError> {
        let form = self.form();
        let (file, content) = match validate(&form, self.max_image_bytes) {
            Ok(valid) => valid,
            Err(e) => {
                guard.advance(SubmissionState::Rejected);
                return Err(e);
            }
        };

        guard.advance(SubmissionState::Encoding);
        let image = encode_data_url(file).await?;

        guard.advance(SubmissionState::Committing);
        let story = Story::new(image, &content, self.clock.now().timestamp_millis());
        {
            let mut store = self.store.lock().await;
            store.append(story.clone()).await?;
            self.rerender(&store).await?;
        }

        self.reset_form();
        Ok(story)
    }

    /// Append a story produced elsewhere (e.g. the headline feed).
    pub async fn append_story(&self, story: Story) -> Result<Vec<Story>, SubmitError> {
        let mut store = self.store.lock().await;
        let evicted = store.append(story).await?;
        self.rerender(&store).await?;
        Ok(evicted)
    }

    /// Delete the story at its render-time position, after confirmation.
    pub async fn delete_story(&self, index: usize) -> Result<ActionOutcome, SubmitError> {
        if !self.confirm.confirm(DELETE_PROMPT).await {
            return Ok(ActionOutcome::Cancelled);
        }

        let result = async {
            let mut store = self.store.lock().await;
            store.delete_at(index).await?;
            self.rerender(&store).await?;
            Ok::<_, SubmitError>(ActionOutcome::Done)
        }
        .await;

        if let Err(e) = &result {
            self.notifier.alert(&e.to_string());
        }
        result
    }

    /// Remove every story, after confirmation.
    pub async fn clear_all(&self) -> Result<ActionOutcome, SubmitError> {
        if !self.confirm.confirm(CLEAR_PROMPT).await {
            return Ok(ActionOutcome::Cancelled);
        }

        let result = async {
            let mut store = self.store.lock().await;
            store.clear().await?;
            self.rerender(&store).await?;
            Ok::<_, SubmitError>(ActionOutcome::Done)
        }
        .await;

        match &result {
            Ok(_) => self.notifier.alert(CLEARED_MESSAGE),
            Err(e) => self.notifier.alert(&e.to_string()),
        }
        result
    }

    /// Snapshot of the stored stories.
    pub async fn stories(&self) -> Result<Vec<Story>, SubmitError> {
        Ok(self.store.lock().await.read_all().await?)
    }

    async fn rerender(&self, store: &StoryStore<S>) -> Result<GalleryView, SubmitError> {
        let view = render(&store.read_all().await?);
        self.view.send_replace(view.clone());
        Ok(view)
    }
}
