//! TUI widgets for the storyboard

pub mod clock_bar;
pub mod gallery;
pub mod input;

pub use clock_bar::ClockBarWidget;
pub use gallery::GalleryWidget;
pub use input::InputWidget;
