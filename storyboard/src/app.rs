//! Main application state and logic

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use storyboard_core::store::DEFAULT_CAPACITY;
use storyboard_core::story::MAX_CONTENT_CHARS;
use storyboard_core::{
    Clock, ClockReading, Confirm, FileStorage, GalleryView, HeadlineFeed, InputController,
    LocalZone, Notifier, SelectedFile, TickEvent,
};
use tokio::sync::{mpsc, oneshot};

use crate::ui::theme::StoryTheme;

/// Which part of the screen receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Story list - navigation and hotkeys (default)
    #[default]
    Gallery,
    /// Image path field
    Path,
    /// Caption field
    Caption,
}

/// A yes/no question waiting on the user.
#[derive(Debug)]
pub struct ConfirmRequest {
    pub prompt: String,
    pub reply: oneshot::Sender<bool>,
}

/// Forwards confirmations to the UI loop and waits for the answer.
pub struct ChannelConfirm {
    tx: mpsc::Sender<ConfirmRequest>,
}

#[async_trait]
impl Confirm for ChannelConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let request = ConfirmRequest {
            prompt: prompt.to_string(),
            reply,
        };
        if self.tx.send(request).await.is_err() {
            return false;
        }
        // A dropped request (e.g. the app quit) counts as cancel
        answer.await.unwrap_or(false)
    }
}

/// Forwards alerts to the UI loop.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<String>,
}

impl Notifier for ChannelNotifier {
    fn alert(&self, message: &str) {
        let _ = self.tx.send(message.to_string());
    }
}

/// Receiving ends of the confirm/alert bridge.
pub struct UiChannels {
    pub confirm_rx: mpsc::Receiver<ConfirmRequest>,
    pub alert_rx: mpsc::UnboundedReceiver<String>,
}

/// Create the confirm and notifier handed to the controller, plus the UI's ends.
pub fn ui_bridge() -> (ChannelConfirm, ChannelNotifier, UiChannels) {
    let (confirm_tx, confirm_rx) = mpsc::channel(4);
    let (alert_tx, alert_rx) = mpsc::unbounded_channel();
    (
        ChannelConfirm { tx: confirm_tx },
        ChannelNotifier { tx: alert_tx },
        UiChannels {
            confirm_rx,
            alert_rx,
        },
    )
}

/// Main application state
pub struct App {
    pub controller: Arc<InputController<FileStorage>>,
    feed: Arc<HeadlineFeed>,
    clock: Arc<dyn Clock>,
    notifier: ChannelNotifier,

    // Background channels
    channels: UiChannels,
    tick_rx: mpsc::Receiver<TickEvent>,

    // Header
    pub clocks: ClockReading,
    pub date: String,

    // UI state
    pub theme: StoryTheme,
    pub focus: Focus,
    pub selected: usize,
    pub capacity: usize,
    path_buffer: String,
    submission: Option<oneshot::Receiver<bool>>,

    // Overlays, highest priority first
    pending_confirm: Option<ConfirmRequest>,
    alerts: VecDeque<String>,
    show_help: bool,

    status_message: Option<String>,
}

impl App {
    pub fn new(
        controller: Arc<InputController<FileStorage>>,
        feed: Arc<HeadlineFeed>,
        clock: Arc<dyn Clock>,
        notifier: ChannelNotifier,
        channels: UiChannels,
        tick_rx: mpsc::Receiver<TickEvent>,
    ) -> Self {
        let now = clock.now();
        Self {
            controller,
            feed,
            notifier,
            channels,
            tick_rx,
            clocks: ClockReading::at(now),
            date: LocalZone::System.long_date(now),
            clock,
            theme: StoryTheme::default(),
            focus: Focus::default(),
            selected: 0,
            capacity: DEFAULT_CAPACITY,
            path_buffer: String::new(),
            submission: None,
            pending_confirm: None,
            alerts: VecDeque::new(),
            show_help: false,
            status_message: Some("Press Tab to add a story, ? for help".to_string()),
        }
    }

    /// Story limit shown in the gallery title.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    // =========================================================================
    // Background updates
    // =========================================================================

    /// Pull in clock ticks, alerts, submission outcomes, and confirmation requests.
    pub fn drain_background(&mut self) {
        while let Ok(event) = self.tick_rx.try_recv() {
            match event {
                TickEvent::Clock(reading) => self.clocks = reading,
                TickEvent::Date(date) => self.date = date,
            }
        }

        if let Some(mut outcome) = self.submission.take() {
            match outcome.try_recv() {
                Ok(true) => {
                    self.path_buffer.clear();
                    self.focus = Focus::Gallery;
                    self.selected = 0;
                }
                // Failed: keep the typed path for another try
                Ok(false) | Err(oneshot::error::TryRecvError::Closed) => {}
                Err(oneshot::error::TryRecvError::Empty) => self.submission = Some(outcome),
            }
        }

        while let Ok(message) = self.channels.alert_rx.try_recv() {
            self.alerts.push_back(message);
        }

        if self.pending_confirm.is_none() {
            if let Ok(request) = self.channels.confirm_rx.try_recv() {
                self.pending_confirm = Some(request);
            }
        }

        let len = self.view().cards().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn view(&self) -> GalleryView {
        self.controller.view()
    }

    pub fn path_buffer(&self) -> &str {
        &self.path_buffer
    }

    pub fn pending_confirm(&self) -> Option<&str> {
        self.pending_confirm.as_ref().map(|r| r.prompt.as_str())
    }

    pub fn current_alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    pub fn help_visible(&self) -> bool {
        self.show_help
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    pub fn answer_confirm(&mut self, yes: bool) {
        if let Some(request) = self.pending_confirm.take() {
            let _ = request.reply.send(yes);
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // =========================================================================
    // Gallery navigation
    // =========================================================================

    pub fn select_next(&mut self) {
        let len = self.view().cards().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    // =========================================================================
    // Form editing
    // =========================================================================

    pub fn focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Gallery => Focus::Path,
            Focus::Path => Focus::Caption,
            Focus::Caption => Focus::Gallery,
        };
    }

    pub fn path_push(&mut self, c: char) {
        self.path_buffer.push(c);
    }

    pub fn path_backspace(&mut self) {
        self.path_buffer.pop();
    }

    /// Type into the caption, stopping at the caption limit.
    pub fn caption_push(&mut self, c: char) {
        self.controller.edit_caption(|caption| {
            if caption.chars().count() < MAX_CONTENT_CHARS {
                caption.push(c);
            }
        });
    }

    pub fn caption_backspace(&mut self) {
        self.controller.edit_caption(|caption| {
            caption.pop();
        });
    }

    // =========================================================================
    // Actions (run as tasks so the UI keeps answering prompts)
    // =========================================================================

    /// Resolve the typed path into the selected file.
    pub fn choose_file(&mut self) {
        let path = self.path_buffer.trim().to_string();
        if path.is_empty() {
            self.controller.select_file(None);
            self.set_status("No image selected");
            return;
        }

        self.set_status(format!("Reading {path}..."));
        let controller = self.controller.clone();
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            match SelectedFile::from_path(&path).await {
                Ok(file) => controller.select_file(Some(file)),
                Err(e) => {
                    controller.select_file(None);
                    notifier.alert(&e.to_string());
                }
            }
        });
    }

    /// Start a submission. The path field is cleared once it succeeds.
    pub fn submit(&mut self) {
        if self.submission.is_some() || self.controller.state().is_busy() {
            return;
        }
        let controller = self.controller.clone();
        let (done, outcome) = oneshot::channel();
        tokio::spawn(async move {
            // Errors reach the user through the notifier
            let added = controller.submit().await.is_ok();
            if added {
                log::info!("story added from the form");
            }
            let _ = done.send(added);
        });
        self.submission = Some(outcome);
    }

    pub fn delete_selected(&mut self) {
        if self.view().is_empty() {
            return;
        }
        let index = self.selected;
        let controller = self.controller.clone();
        tokio::spawn(async move {
            let _ = controller.delete_story(index).await;
        });
    }

    pub fn clear_all(&mut self) {
        let controller = self.controller.clone();
        tokio::spawn(async move {
            let _ = controller.clear_all().await;
        });
    }

    pub fn refresh(&mut self) {
        let controller = self.controller.clone();
        tokio::spawn(async move {
            let _ = controller.refresh().await;
        });
    }

    pub fn pull_feed(&mut self) {
        if !self.feed.is_enabled() {
            self.set_status("Headline feed disabled (set NEWS_API_KEY)");
            return;
        }

        self.set_status("Fetching headlines...");
        let controller = self.controller.clone();
        let feed = self.feed.clone();
        let clock = self.clock.clone();
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            match feed.pull_into(controller.as_ref(), clock.as_ref()).await {
                Ok(report) => notifier.alert(&format!(
                    "Added {} headline stories ({} skipped).",
                    report.added, report.skipped
                )),
                Err(e) => notifier.alert(&e.to_string()),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_core::testing::{png_file, FixedClock};
    use storyboard_core::StoryStore;
    use tempfile::TempDir;

    async fn test_app(dir: &TempDir) -> App {
        let (confirm, notifier, channels) = ui_bridge();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at_millis(1_700_000_000_000));
        let store = StoryStore::new(FileStorage::open(dir.path()).await.unwrap());
        let controller = Arc::new(InputController::new(
            store,
            Arc::new(notifier.clone()),
            Arc::new(confirm),
            clock.clone(),
        ));
        let (_tick_tx, tick_rx) = mpsc::channel(1);
        App::new(
            controller,
            Arc::new(HeadlineFeed::disabled()),
            clock,
            notifier,
            channels,
            tick_rx,
        )
    }

    #[tokio::test]
    async fn test_caption_stops_at_limit() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;

        for _ in 0..(MAX_CONTENT_CHARS + 10) {
            app.caption_push('x');
        }
        assert_eq!(app.controller.form().caption.chars().count(), MAX_CONTENT_CHARS);
        assert_eq!(app.controller.counter_text(), "300/300 characters");

        app.caption_backspace();
        assert_eq!(app.controller.counter_text(), "299/300 characters");
    }

    #[tokio::test]
    async fn test_alerts_queue_in_order() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;

        app.notifier.alert("first");
        app.notifier.alert("second");
        app.drain_background();

        assert_eq!(app.current_alert(), Some("first"));
        app.dismiss_alert();
        assert_eq!(app.current_alert(), Some("second"));
        app.dismiss_alert();
        assert_eq!(app.current_alert(), None);
    }

    #[tokio::test]
    async fn test_confirm_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        let (confirm, _notifier, channels) = ui_bridge();
        app.channels = channels;

        let asking = tokio::spawn(async move { confirm.confirm("Delete?").await });
        while app.pending_confirm().is_none() {
            tokio::task::yield_now().await;
            app.drain_background();
        }
        assert_eq!(app.pending_confirm(), Some("Delete?"));

        app.answer_confirm(true);
        assert!(asking.await.unwrap());
        assert_eq!(app.pending_confirm(), None);
    }

    #[tokio::test]
    async fn test_focus_cycles() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;

        assert_eq!(app.focus, Focus::Gallery);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Path);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Caption);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Gallery);
    }

    async fn finish_submission(app: &mut App) {
        while app.submission.is_some() {
            tokio::task::yield_now().await;
            app.drain_background();
        }
    }

    fn type_path(app: &mut App, path: &str) {
        app.focus(Focus::Path);
        for c in path.chars() {
            app.path_push(c);
        }
    }

    #[tokio::test]
    async fn test_successful_submit_clears_path() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        type_path(&mut app, "cat.png");
        app.controller.select_file(Some(png_file("cat.png")));
        app.controller.set_caption("a cat");

        app.submit();
        finish_submission(&mut app).await;

        assert_eq!(app.path_buffer(), "");
        assert_eq!(app.focus, Focus::Gallery);
        assert_eq!(app.view().cards().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_path() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        type_path(&mut app, "typo.png");
        app.controller.set_caption("no image chosen");

        app.submit();
        finish_submission(&mut app).await;

        assert_eq!(app.path_buffer(), "typo.png");
        assert_eq!(app.focus, Focus::Path);
        assert!(app.view().is_empty());
        assert!(app.current_alert().is_some());
    }
}
