//! UI module for the storyboard TUI

pub mod render;
pub mod theme;
pub mod widgets;
