//! tcalc - Terminal Calculator Library
//!
//! A keypad calculator for the terminal. Expressions are parsed by a small
//! arithmetic grammar and never executed as code; successful evaluations are
//! appended to a CSV log.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
