//! Story gallery widget core.
//!
//! This crate provides:
//! - A bounded, newest-first story store over pluggable key-value storage
//! - Gallery rendering with escaped HTML output
//! - The submission controller (validation, image encoding, commit)
//! - IST/EST clocks, the long-form date, and a midnight-exact ticker
//! - An optional headline feed that appends stories through the same path
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use storyboard_core::{InputController, StoryboardConfig, SelectedFile, SystemClock};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryboardConfig::from_env()?;
//!     let store = config.open_store().await?;
//!     let controller = InputController::new(store, notifier, confirm, Arc::new(SystemClock));
//!
//!     controller.select_file(Some(SelectedFile::from_path("cat.png").await?));
//!     controller.set_caption("My cat");
//!     controller.submit().await?;
//!
//!     println!("{}", controller.view().to_html());
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod controller;
pub mod encode;
pub mod feed;
pub mod render;
pub mod storage;
pub mod store;
pub mod story;
pub mod testing;
pub mod ticker;

// Primary public API
pub use clock::{Clock, ClockReading, LocalZone, SystemClock};
pub use config::{ConfigError, StoryboardConfig};
pub use controller::{
    counter_text, ActionOutcome, Confirm, CounterStyle, InputController, Notifier,
    SubmissionForm, SubmissionState, SubmitError,
};
pub use encode::{EncodeError, SelectedFile};
pub use feed::{FeedError, FeedReport, HeadlineFeed};
pub use render::{render, render_page, GalleryView, StoryCard};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{StoreConfig, StoreError, StoryStore};
pub use story::Story;
pub use testing::{RecordingNotifier, ScriptedConfirm, TestHarness};
pub use ticker::{TickEvent, Ticker};
