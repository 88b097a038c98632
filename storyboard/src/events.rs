//! Event handling for the storyboard TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Focus};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key_event(app, key),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    // Overlays swallow keys, confirmation first
    if app.pending_confirm().is_some() {
        return handle_confirm_key(app, key);
    }
    if app.current_alert().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return EventResult::NeedsRedraw;
    }
    if app.help_visible() {
        app.toggle_help();
        return EventResult::NeedsRedraw;
    }

    match app.focus {
        Focus::Gallery => handle_gallery_key(app, key),
        Focus::Path => handle_path_key(app, key),
        Focus::Caption => handle_caption_key(app, key),
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_confirm(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_confirm(false),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Keys while the story list has focus
fn handle_gallery_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('q') => return EventResult::Quit,
        KeyCode::Char('?') | KeyCode::F(1) => app.toggle_help(),

        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),

        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('C') => app.clear_all(),
        KeyCode::Char('f') => app.pull_feed(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('s') => app.submit(),

        KeyCode::Char('i') | KeyCode::Char('c') => app.focus(Focus::Caption),
        KeyCode::Char('o') => app.focus(Focus::Path),
        KeyCode::Tab => app.cycle_focus(),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Keys while typing the image path
fn handle_path_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Enter => {
            app.choose_file();
            app.focus(Focus::Caption);
        }
        KeyCode::Tab => {
            app.choose_file();
            app.cycle_focus();
        }
        KeyCode::Esc => app.focus(Focus::Gallery),
        KeyCode::Backspace => app.path_backspace(),
        KeyCode::Char(c) => app.path_push(c),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Keys while typing the caption
fn handle_caption_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Esc => app.focus(Focus::Gallery),
        KeyCode::Backspace => app.caption_backspace(),
        KeyCode::Char(c) => app.caption_push(c),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}
