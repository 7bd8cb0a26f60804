//! Application layer: keypad state and the evaluation workflow.
//!
//! This module sits between the domain layer (parsing and arithmetic) and the
//! presentation layer, and is where evaluations meet the log store.

pub mod keypad;
pub mod session;
pub mod state;

pub use keypad::*;
pub use session::*;
pub use state::*;
