//! Terminal user interface for the market dashboard.
//!
//! Renders the dashboard's panels with Ratatui and maps key presses onto
//! dashboard operations.

pub mod app;
pub mod components;
pub mod event;
pub mod input;
pub mod settings_dialog;
pub mod tabs;
pub mod terminal;
pub mod ui;

pub use app::App;
pub use event::{Event, Message};
pub use terminal::{Tui, restore_terminal, setup_terminal};
pub use ui::render;
