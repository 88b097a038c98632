//! Story list widget

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use storyboard_core::{GalleryView, StoryCard};

use crate::ui::theme::StoryTheme;

/// The gallery, one entry per card or the empty-state message
pub struct GalleryWidget<'a> {
    view: &'a GalleryView,
    theme: &'a StoryTheme,
    selected: usize,
    capacity: usize,
    focused: bool,
}

impl<'a> GalleryWidget<'a> {
    pub fn new(view: &'a GalleryView, theme: &'a StoryTheme) -> Self {
        Self {
            view,
            theme,
            selected: 0,
            capacity: 0,
            focused: false,
        }
    }

    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn card_lines(&self, card: &StoryCard) -> Vec<Line<'a>> {
        let is_selected = self.focused && card.index == self.selected;
        let marker = if is_selected { "▸ " } else { "  " };

        let mut meta = vec![image_summary(&card.image_src)];
        if let Some(when) = chrono::DateTime::from_timestamp_millis(card.timestamp) {
            meta.push(
                when.with_timezone(&chrono::Local)
                    .format("%b %-d, %H:%M")
                    .to_string(),
            );
        }

        vec![
            Line::from(vec![
                Span::styled(marker, self.theme.caption_style(is_selected)),
                Span::styled(format!("[{}] ", card.index), self.theme.meta_style()),
                Span::styled(card.caption.clone(), self.theme.caption_style(is_selected)),
            ]),
            Line::from(Span::styled(format!("      {}", meta.join(" · ")), self.theme.meta_style())),
            Line::default(),
        ]
    }
}

impl Widget for GalleryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let count = self.view.cards().len();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused))
            .title(format!(" Stories ({count}/{}) ", self.capacity));

        let inner = block.inner(area);
        block.render(area, buf);

        match self.view {
            GalleryView::Empty { message } => {
                Paragraph::new(Line::styled(message.clone(), self.theme.meta_style()))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(inner, buf);
            }
            GalleryView::Cards(cards) => {
                let lines: Vec<Line> = cards.iter().flat_map(|c| self.card_lines(c)).collect();

                // Keep the selected card on screen
                let per_card = 3u16;
                let visible = (inner.height / per_card).max(1) as usize;
                let first = self.selected.saturating_sub(visible - 1);
                Paragraph::new(lines)
                    .scroll(((first as u16) * per_card, 0))
                    .render(inner, buf);
            }
        }
    }
}

/// MIME type and approximate size of a data URI image.
fn image_summary(src: &str) -> String {
    let (header, payload) = src.split_once(',').unwrap_or(("", src));
    let mime = header
        .strip_prefix("data:")
        .and_then(|h| h.split(';').next())
        .filter(|m| !m.is_empty())
        .unwrap_or("image");
    let bytes = payload.len() * 3 / 4;
    format!("{mime}, {}", human_size(bytes))
}

fn human_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_summary() {
        assert_eq!(image_summary("data:image/png;base64,AAAA"), "image/png, 3 B");
        assert_eq!(image_summary("not a data uri"), "image, 10 B");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}
