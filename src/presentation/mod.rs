//! Presentation layer handling terminal UI and user input.
//!
//! This module draws the keypad with ratatui and maps keyboard and mouse
//! events onto application state.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
