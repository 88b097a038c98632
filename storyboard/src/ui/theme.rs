//! Color theme and styling for the storyboard TUI

use ratatui::style::{Color, Modifier, Style};

/// UI color theme
#[derive(Debug, Clone)]
pub struct StoryTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Header
    pub ist_clock: Color,
    pub est_clock: Color,
    pub date: Color,

    // Gallery
    pub caption: Color,
    pub selected: Color,
    pub meta_text: Color,

    // Form
    pub counter: Color,
    pub counter_full: Color,
    pub busy: Color,

    // Overlays
    pub alert: Color,
    pub confirm: Color,
}

impl Default for StoryTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            ist_clock: Color::LightYellow,
            est_clock: Color::LightBlue,
            date: Color::Gray,

            caption: Color::White,
            selected: Color::Cyan,
            meta_text: Color::DarkGray,

            counter: Color::DarkGray,
            counter_full: Color::LightRed,
            busy: Color::Yellow,

            alert: Color::LightGreen,
            confirm: Color::LightRed,
        }
    }
}

impl StoryTheme {
    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn clock_style(&self, color: Color) -> Style {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Caption style, highlighted when the card is selected
    pub fn caption_style(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(self.selected)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.caption)
        }
    }

    pub fn meta_style(&self) -> Style {
        Style::default()
            .fg(self.meta_text)
            .add_modifier(Modifier::DIM)
    }

    /// Counter turns red at the caption limit
    pub fn counter_style(&self, full: bool) -> Style {
        Style::default().fg(if full { self.counter_full } else { self.counter })
    }

    pub fn button_style(&self, busy: bool) -> Style {
        if busy {
            Style::default().fg(self.busy).add_modifier(Modifier::DIM)
        } else {
            Style::default()
                .fg(self.foreground)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        }
    }
}
