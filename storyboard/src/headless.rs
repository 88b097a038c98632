//! Headless mode for the story gallery.
//!
//! A line-oriented protocol over stdin/stdout for scripts and automated
//! testing. Every line starting with `#` is a command; confirmation prompts
//! are answered with `y` or `n` on the next line.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use storyboard_core::clock::ClockReading;
use storyboard_core::story::{truncate_chars, MAX_CONTENT_CHARS};
use storyboard_core::{
    render_page, ActionOutcome, Clock, Confirm, FileStorage, GalleryView, HeadlineFeed,
    InputController, LocalZone, Notifier, SelectedFile,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

type StdinLines = Arc<Mutex<Lines<BufReader<Stdin>>>>;

/// Prints alerts on their own tagged line.
pub struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn alert(&self, message: &str) {
        println!("[ALERT] {message}");
    }
}

/// Asks on stdout and reads `y`/`n` from the shared stdin reader.
pub struct StdinConfirm {
    lines: StdinLines,
}

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        println!("[CONFIRM] {prompt} (y/n)");
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(answer)) => parse_answer(&answer),
            Ok(None) => false,
            Err(e) => {
                log::warn!("failed to read confirmation: {e}");
                false
            }
        }
    }
}

/// `y`/`yes` confirm, anything else cancels.
pub fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Everything a headless session needs.
pub struct HeadlessSession {
    pub controller: Arc<InputController<FileStorage>>,
    pub clock: Arc<dyn Clock>,
    pub feed: HeadlineFeed,
}

/// Build the stdin-backed confirm along with the reader it shares.
pub fn stdin_confirm() -> (StdinConfirm, StdinLines) {
    let lines = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    (
        StdinConfirm {
            lines: lines.clone(),
        },
        lines,
    )
}

/// A parsed protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { path: String, caption: String },
    Delete(usize),
    Clear,
    List,
    Clock,
    Html(String),
    Feed,
    Help,
    Quit,
}

/// Parse one `#command` line. Errors are usage messages.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let Some(body) = line.strip_prefix('#') else {
        return Err("Unknown input. Type #help for help.".to_string());
    };
    let mut parts = body.trim().splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    match name {
        "add" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            match (args.next(), args.next()) {
                (Some(path), Some(caption)) if !path.is_empty() => Ok(Command::Add {
                    path: path.to_string(),
                    caption: caption.trim().to_string(),
                }),
                _ => Err("Usage: #add <path> <caption>".to_string()),
            }
        }
        "delete" => rest
            .parse()
            .map(Command::Delete)
            .map_err(|_| "Usage: #delete <index>".to_string()),
        "clear" => Ok(Command::Clear),
        "list" => Ok(Command::List),
        "clock" => Ok(Command::Clock),
        "html" if !rest.is_empty() => Ok(Command::Html(rest.to_string())),
        "html" => Err("Usage: #html <path>".to_string()),
        "feed" => Ok(Command::Feed),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err("Unknown command. Type #help for help.".to_string()),
    }
}

/// Run the protocol until `#quit` or end of input.
pub async fn run_headless(
    session: HeadlessSession,
    lines: StdinLines,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Storyboard Headless Mode ===");
    print_header(session.clock.as_ref());
    // A corrupt store is reported through the notifier; keep going with the commands
    if let Ok(view) = session.controller.refresh().await {
        print_gallery(&view);
    }
    println!();
    print_help();
    println!();

    loop {
        // Release the reader before dispatching so confirmations can read
        let next = lines.lock().await.next_line().await;
        let line = match next {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Ok(Command::Quit) => {
                println!("Goodbye!");
                break;
            }
            Ok(command) => execute(&session, command).await,
            Err(usage) => println!("[ERROR] {usage}"),
        }
    }

    Ok(())
}

async fn execute(session: &HeadlessSession, command: Command) {
    let controller = &session.controller;

    match command {
        Command::Add { path, caption } => {
            let file = match SelectedFile::from_path(&path).await {
                Ok(f) => f,
                Err(e) => {
                    println!("[ERROR] {e}");
                    return;
                }
            };
            controller.select_file(Some(file));
            controller.set_caption(truncate_chars(&caption, MAX_CONTENT_CHARS));
            if controller.submit().await.is_ok() {
                print_gallery(&controller.view());
            }
        }
        Command::Delete(index) => match controller.delete_story(index).await {
            Ok(ActionOutcome::Done) => {
                println!("[DELETED] {index}");
                print_gallery(&controller.view());
            }
            Ok(ActionOutcome::Cancelled) => println!("[CANCELLED]"),
            // Already reported through the notifier
            Err(_) => {}
        },
        Command::Clear => match controller.clear_all().await {
            Ok(ActionOutcome::Done) => print_gallery(&controller.view()),
            Ok(ActionOutcome::Cancelled) => println!("[CANCELLED]"),
            Err(_) => {}
        },
        Command::List => {
            if let Ok(view) = controller.refresh().await {
                print_gallery(&view);
            }
        }
        Command::Clock => print_header(session.clock.as_ref()),
        Command::Html(path) => match export_html(controller, session.clock.as_ref(), Path::new(&path)).await {
            Ok(()) => println!("[SAVED] Gallery written to {path}"),
            Err(e) => println!("[ERROR] {e}"),
        },
        Command::Feed => {
            if !session.feed.is_enabled() {
                println!("[FEED] Disabled (set NEWS_API_KEY to enable)");
                return;
            }
            match session.feed.pull_into(controller.as_ref(), session.clock.as_ref()).await {
                Ok(report) => {
                    println!("[FEED] Added {}, skipped {}", report.added, report.skipped);
                    print_gallery(&controller.view());
                }
                Err(e) => println!("[ERROR] {e}"),
            }
        }
        Command::Help => print_help(),
        Command::Quit => {}
    }
}

/// Write the full gallery page to `path`.
pub async fn export_html(
    controller: &InputController<FileStorage>,
    clock: &dyn Clock,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let view = controller.refresh().await?;
    let now = clock.now();
    let page = render_page(&view, &ClockReading::at(now), &LocalZone::System.long_date(now));
    tokio::fs::write(path, page).await?;
    Ok(())
}

fn print_header(clock: &dyn Clock) {
    let now = clock.now();
    let reading = ClockReading::at(now);
    println!("[CLOCK] {}", reading.ist_label());
    println!("[CLOCK] {}", reading.est_label());
    println!("[DATE] {}", LocalZone::System.long_date(now));
}

fn print_gallery(view: &GalleryView) {
    match view {
        GalleryView::Empty { message } => println!("[GALLERY] {message}"),
        GalleryView::Cards(cards) => {
            println!("[GALLERY] {} stories", cards.len());
            for card in cards {
                let when = chrono::DateTime::from_timestamp_millis(card.timestamp)
                    .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("  [{}] {} ({when})", card.index, card.caption);
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  #add <path> <caption> - Add a story from an image file");
    println!("  #delete <index>       - Delete the story at a gallery position");
    println!("  #clear                - Delete all stories");
    println!("  #list                 - Show the gallery");
    println!("  #clock                - Show the IST/EST clocks and the date");
    println!("  #html <path>          - Write the gallery page as HTML");
    println!("  #feed                 - Pull top headlines into the gallery");
    println!("  #help                 - Show this help");
    println!("  #quit                 - Exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_keeps_caption_spaces() {
        assert_eq!(
            parse_command("#add cat.png My  lovely cat").unwrap(),
            Command::Add {
                path: "cat.png".to_string(),
                caption: "My  lovely cat".to_string(),
            }
        );
        assert!(parse_command("#add cat.png").is_err());
        assert!(parse_command("#add").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("#delete 2").unwrap(), Command::Delete(2));
        assert!(parse_command("#delete two").is_err());
        assert_eq!(parse_command("#clear").unwrap(), Command::Clear);
        assert_eq!(parse_command("#list").unwrap(), Command::List);
        assert_eq!(parse_command("#html out.html").unwrap(), Command::Html("out.html".to_string()));
        assert!(parse_command("#html").is_err());
        assert_eq!(parse_command("#exit").unwrap(), Command::Quit);
        assert!(parse_command("#dance").is_err());
        assert!(parse_command("hello").is_err());
    }

    #[test]
    fn test_parse_answer() {
        assert!(parse_answer("y"));
        assert!(parse_answer(" YES "));
        assert!(!parse_answer("n"));
        assert!(!parse_answer(""));
        assert!(!parse_answer("maybe"));
    }
}
