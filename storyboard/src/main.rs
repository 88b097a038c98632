//! Storyboard: a five-story gallery with IST/EST clocks.
//!
//! Runs as a terminal UI by default.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line protocol suitable for scripts and automated testing:
//!
//! ```bash
//! cargo run -p storyboard -- --headless --dir /tmp/stories
//! ```

mod app;
mod events;
mod headless;
mod logging;
mod ui;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storyboard_core::config::parse_counter_style;
use storyboard_core::{
    Clock, Confirm, CounterStyle, FileStorage, HeadlineFeed, InputController, Notifier,
    StoryStore, StoryboardConfig, SystemClock, Ticker,
};

use app::{ui_bridge, App};
use events::{handle_event, EventResult};
use headless::{HeadlessSession, PrintNotifier};
use ui::render::render;

#[derive(Debug, Parser)]
#[command(name = "storyboard", version, about = "Story gallery with IST/EST clocks")]
struct Cli {
    /// Run the line protocol on stdin/stdout instead of the TUI
    #[arg(long)]
    headless: bool,

    /// Write the gallery as an HTML page to PATH and exit
    #[arg(long, value_name = "PATH")]
    export_html: Option<PathBuf>,

    /// Storage directory (overrides STORYBOARD_DIR)
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Storage key (overrides STORYBOARD_KEY)
    #[arg(long)]
    key: Option<String>,

    /// Number of stories kept (overrides STORYBOARD_CAPACITY)
    #[arg(long)]
    capacity: Option<usize>,

    /// Largest accepted image in bytes (overrides STORYBOARD_MAX_IMAGE_BYTES)
    #[arg(long, value_name = "BYTES")]
    max_image_bytes: Option<u64>,

    /// Counter style: rich or minimal (overrides STORYBOARD_COUNTER)
    #[arg(long, value_parser = parse_counter)]
    counter: Option<CounterStyle>,

    /// Pull top headlines once at startup
    #[arg(long)]
    feed: bool,
}

impl Cli {
    fn apply(&self, mut config: StoryboardConfig) -> StoryboardConfig {
        if let Some(dir) = &self.dir {
            config = config.with_storage_dir(dir);
        }
        if let Some(key) = &self.key {
            config = config.with_storage_key(key);
        }
        if let Some(capacity) = self.capacity {
            config = config.with_capacity(capacity);
        }
        if let Some(limit) = self.max_image_bytes {
            config = config.with_max_image_bytes(limit);
        }
        if let Some(style) = self.counter {
            config = config.with_counter_style(style);
        }
        config
    }
}

fn parse_counter(value: &str) -> Result<CounterStyle, String> {
    parse_counter_style(value).ok_or_else(|| format!("expected 'rich' or 'minimal', got '{value}'"))
}

fn build_controller(
    store: StoryStore<FileStorage>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    clock: Arc<dyn Clock>,
    config: &StoryboardConfig,
) -> Arc<InputController<FileStorage>> {
    Arc::new(
        InputController::new(store, notifier, confirm, clock)
            .with_max_image_bytes(config.max_image_bytes)
            .with_counter_style(config.counter_style),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    // Reads .env if present
    let config = cli.apply(StoryboardConfig::from_env()?);
    let store = config.open_store().await?;

    let tui = !cli.headless && cli.export_html.is_none();
    let log_file = config.storage_dir.join(logging::LOG_FILE);
    logging::init_logger(tui.then_some(log_file.as_path()));
    log::info!(
        "storage at {} (key '{}', capacity {})",
        config.storage_dir.display(),
        config.storage_key,
        config.capacity
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let feed = HeadlineFeed::from_api_key(
        config.news_api_key.as_deref(),
        &config.news_country,
        config.capacity,
    )
    .with_max_image_bytes(config.max_image_bytes);

    if !tui {
        let (confirm, lines) = headless::stdin_confirm();
        let controller = build_controller(
            store,
            Arc::new(PrintNotifier),
            Arc::new(confirm),
            clock.clone(),
            &config,
        );

        if let Some(path) = &cli.export_html {
            headless::export_html(&controller, clock.as_ref(), path).await?;
            println!("Gallery written to {}", path.display());
            return Ok(());
        }

        if cli.feed && feed.is_enabled() {
            if let Err(e) = feed.pull_into(controller.as_ref(), clock.as_ref()).await {
                eprintln!("Headline feed failed: {e}");
            }
        }
        let session = HeadlessSession {
            controller,
            clock,
            feed,
        };
        return headless::run_headless(session, lines).await;
    }

    let (confirm, notifier, channels) = ui_bridge();
    let controller = build_controller(
        store,
        Arc::new(notifier.clone()),
        Arc::new(confirm),
        clock.clone(),
        &config,
    );
    // Surface a corrupt store as an alert before the first frame
    let _ = controller.refresh().await;

    let (tick_rx, ticker) = Ticker::new(clock.clone()).spawn();
    let mut app = App::new(
        controller,
        Arc::new(feed),
        clock,
        notifier,
        channels,
        tick_rx,
    )
    .with_capacity(config.capacity);
    if cli.feed {
        app.pull_feed();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    ticker.abort();

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        app.drain_background();
        terminal.draw(|f| render(f, &app))?;

        // Short poll so clock ticks and prompts show up promptly
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            if handle_event(&mut app, ev) == EventResult::Quit {
                return Ok(());
            }
        } else {
            tokio::task::yield_now().await;
        }
    }
}
