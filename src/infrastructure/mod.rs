//! Infrastructure layer providing external service integrations.
//!
//! This module contains implementations for external concerns like
//! the evaluation log, configuration loading and the system clipboard.

pub mod clipboard;
pub mod config;
pub mod persistence;

pub use clipboard::*;
pub use config::*;
pub use persistence::*;
