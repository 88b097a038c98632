//! Render orchestration for the storyboard TUI

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use storyboard_core::story::MAX_CONTENT_CHARS;

use crate::app::{App, Focus};
use crate::ui::widgets::{ClockBarWidget, GalleryWidget, InputWidget};

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let [header, gallery, path, caption, actions, status] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(5),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(ClockBarWidget::new(&app.clocks, &app.date, &app.theme), header);

    let view = app.view();
    let gallery_widget = GalleryWidget::new(&view, &app.theme)
        .selected(app.selected)
        .capacity(app.capacity)
        .focused(app.focus == Focus::Gallery);
    frame.render_widget(gallery_widget, gallery);

    render_form(frame, app, path, caption);
    render_actions(frame, app, actions);
    render_status_bar(frame, app, status);

    // Overlays, lowest priority first so the most urgent ends on top
    if app.help_visible() {
        render_help_overlay(frame, app, area);
    }
    if let Some(message) = app.current_alert() {
        render_message_overlay(frame, " Notice ", message, "Enter to dismiss", app.theme.alert, area);
    }
    if let Some(prompt) = app.pending_confirm() {
        render_message_overlay(frame, " Confirm ", prompt, "y = yes, n = no", app.theme.confirm, area);
    }
}

fn render_form(frame: &mut Frame, app: &App, path_area: Rect, caption_area: Rect) {
    let form = app.controller.form();

    let file_hint = match &form.file {
        Some(file) => format!("selected: {} ({} bytes)", file.name, file.size),
        None => "no image selected".to_string(),
    };
    let path_widget = InputWidget::new("Image file", app.path_buffer(), &app.theme)
        .placeholder("Press o and type a path to a PNG, JPEG, GIF, or WebP image")
        .hint(file_hint, app.theme.meta_style())
        .active(app.focus == Focus::Path);
    frame.render_widget(path_widget, path_area);

    let full = form.caption.chars().count() >= MAX_CONTENT_CHARS;
    let caption_widget = InputWidget::new("Story", &form.caption, &app.theme)
        .placeholder("Press i to write a caption")
        .hint(app.controller.counter_text(), app.theme.counter_style(full))
        .active(app.focus == Focus::Caption);
    frame.render_widget(caption_widget, caption_area);
}

fn render_actions(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.controller.state();
    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!(" {} ", state.submit_label()),
            app.theme.button_style(state.is_busy()),
        ),
        Span::raw("  "),
        Span::styled(
            "[s] submit  [d] delete  [C] clear all  [f] headlines  [?] help  [q] quit",
            app.theme.meta_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let text = app.status().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Line::styled(format!(" {text}"), app.theme.meta_style())),
        area,
    );
}

fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(54, 18, area);
    frame.render_widget(Clear, popup_area);

    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::BOLD));
    let lines = vec![
        Line::from(vec![key("Gallery")]),
        Line::from(vec![key("  j/k      "), Span::raw("select story")]),
        Line::from(vec![key("  d        "), Span::raw("delete selected story")]),
        Line::from(vec![key("  C        "), Span::raw("delete all stories")]),
        Line::from(vec![key("  f        "), Span::raw("pull top headlines")]),
        Line::from(vec![key("  r        "), Span::raw("reload from storage")]),
        Line::default(),
        Line::from(vec![key("Form")]),
        Line::from(vec![key("  o        "), Span::raw("edit image path (Enter selects)")]),
        Line::from(vec![key("  i        "), Span::raw("edit caption (Enter submits)")]),
        Line::from(vec![key("  s        "), Span::raw("submit story")]),
        Line::from(vec![key("  Tab/Esc  "), Span::raw("next field / back to gallery")]),
        Line::default(),
        Line::from(vec![key("  q        "), Span::raw("quit")]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true))
        .title(" Help ");
    frame.render_widget(Paragraph::new(lines).block(block), popup_area);
}

fn render_message_overlay(
    frame: &mut Frame,
    title: &str,
    message: &str,
    footer: &str,
    color: ratatui::style::Color,
    area: Rect,
) {
    let popup_area = centered_rect_fixed(50, 7, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string())
        .title_bottom(Line::from(format!(" {footer} ")).centered());
    let paragraph = Paragraph::new(message.to_string())
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup_area);
}

/// A `width` x `height` rect centered in `area`, clipped to fit.
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
