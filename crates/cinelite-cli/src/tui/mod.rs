//! TUI module for interactive terminal interfaces.
//!
//! Uses `ratatui` + `crossterm` for rendering.

/// Movie browser TUI.
pub mod browser;

pub use browser::run_browser;
