//! Single-line input field widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::StoryTheme;

pub struct InputWidget<'a> {
    title: &'a str,
    content: &'a str,
    theme: &'a StoryTheme,
    placeholder: &'a str,
    hint: Option<(String, Style)>,
    is_active: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(title: &'a str, content: &'a str, theme: &'a StoryTheme) -> Self {
        Self {
            title,
            content,
            theme,
            placeholder: "",
            hint: None,
            is_active: false,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Text shown at the bottom right of the border (e.g. the counter)
    pub fn hint(mut self, text: String, style: Style) -> Self {
        self.hint = Some((text, style));
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.is_active))
            .title(format!(" {} ", self.title));
        if let Some((text, style)) = self.hint {
            block = block.title_bottom(Line::styled(format!(" {text} "), style).right_aligned());
        }

        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.content.is_empty() && !self.is_active {
            Line::from(Span::styled(
                self.placeholder,
                Style::default().add_modifier(Modifier::DIM),
            ))
        } else {
            // Show the tail when the text is wider than the field
            let width = inner.width.saturating_sub(1) as usize;
            let count = self.content.chars().count();
            let visible: String = self.content.chars().skip(count.saturating_sub(width)).collect();

            let mut spans = vec![Span::raw(visible)];
            if self.is_active {
                spans.push(Span::styled(
                    " ",
                    Style::default().add_modifier(Modifier::UNDERLINED | Modifier::REVERSED),
                ));
            }
            Line::from(spans)
        };

        Paragraph::new(line).render(inner, buf);
    }
}
