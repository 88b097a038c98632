//! IST/EST clocks and the date line

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use storyboard_core::ClockReading;

use crate::ui::theme::StoryTheme;

pub struct ClockBarWidget<'a> {
    clocks: &'a ClockReading,
    date: &'a str,
    theme: &'a StoryTheme,
}

impl<'a> ClockBarWidget<'a> {
    pub fn new(clocks: &'a ClockReading, date: &'a str, theme: &'a StoryTheme) -> Self {
        Self {
            clocks,
            date,
            theme,
        }
    }
}

impl Widget for ClockBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false))
            .title(" Storyboard ");

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = vec![
            Line::from(vec![
                Span::styled(self.clocks.ist_label(), self.theme.clock_style(self.theme.ist_clock)),
                Span::raw("    "),
                Span::styled(self.clocks.est_label(), self.theme.clock_style(self.theme.est_clock)),
            ]),
            Line::styled(self.date.to_string(), ratatui::style::Style::default().fg(self.theme.date)),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}
