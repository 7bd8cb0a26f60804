//! Application state for the terminal keypad.
//!
//! [`App`] owns the entry buffer, the cursor, the error marker and the
//! in-memory history panel. The presentation layer reads it to draw a frame
//! and mutates it through the methods below.

use super::keypad::KeypadKey;
use super::session::evaluate_and_record;
use crate::domain::parser::MAX_EXPRESSION_LEN;
use crate::domain::{EvalError, evaluate};
use crate::infrastructure::{EvaluationLogger, SystemClipboard};
use std::collections::VecDeque;

/// Text shown in place of the entry after a failed evaluation.
pub const ERROR_MARKER: &str = "Error";

/// Default number of entries kept in the history panel.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Keypad is active
    Normal,
    /// Help screen is displayed
    Help,
}

/// A successful evaluation shown in the history panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub expression: String,
    pub result: String,
}

/// Main application state for the keypad.
///
/// # Examples
///
/// ```
/// use tcalc::application::{App, KeypadKey};
///
/// let mut app = App::default();
/// for c in "2*3+4".chars() {
///     app.press(KeypadKey::Input(c));
/// }
/// app.press(KeypadKey::Equals);
/// assert_eq!(app.display_text(), "10");
/// ```
#[derive(Debug)]
pub struct App {
    /// Expression being typed, or the last result
    pub entry: String,
    /// Cursor position within the entry, in characters
    pub cursor_position: usize,
    /// Whether the display shows the error marker instead of the entry
    pub showing_error: bool,
    /// Current application mode
    pub mode: AppMode,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Recent successful evaluations, oldest first
    pub history: VecDeque<HistoryEntry>,
    /// Maximum length of `history`
    pub history_limit: usize,
    /// Keypad key most recently pressed, for highlighting
    pub last_key: Option<KeypadKey>,
    /// Set when the user asks to leave
    pub should_quit: bool,
    logger: Option<EvaluationLogger>,
    clipboard: SystemClipboard,
}

impl Default for App {
    fn default() -> Self {
        Self {
            entry: String::new(),
            cursor_position: 0,
            showing_error: false,
            mode: AppMode::Normal,
            help_scroll: 0,
            status_message: None,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            last_key: None,
            should_quit: false,
            logger: None,
            clipboard: SystemClipboard::new(),
        }
    }
}

impl App {
    /// Creates an app that records successful evaluations to `logger`.
    ///
    /// The history panel is seeded with the newest records already in the
    /// store. An unreadable store leaves the panel empty.
    pub fn new(logger: Option<EvaluationLogger>, history_limit: usize) -> Self {
        let mut app = Self {
            history_limit,
            logger,
            ..Self::default()
        };
        app.load_history();
        app
    }

    pub fn logger(&self) -> Option<&EvaluationLogger> {
        self.logger.as_ref()
    }

    fn load_history(&mut self) {
        let Some(logger) = &self.logger else {
            return;
        };
        match logger.read_records() {
            Ok(records) => {
                let skip = records.len().saturating_sub(self.history_limit);
                self.history = records
                    .into_iter()
                    .skip(skip)
                    .map(|record| HistoryEntry {
                        expression: record.expression,
                        result: record.result,
                    })
                    .collect();
            }
            Err(err) => tracing::warn!(%err, "could not read evaluation history"),
        }
    }

    /// Applies a keypad button press.
    pub fn press(&mut self, key: KeypadKey) {
        self.last_key = Some(key);
        match key {
            KeypadKey::Input(c) => self.insert_char(c),
            KeypadKey::Equals => self.evaluate_entry(),
            KeypadKey::Clear => self.clear(),
            KeypadKey::Backspace => self.backspace(),
            KeypadKey::ToggleSign => self.toggle_sign(),
        }
    }

    /// The text the display shows.
    pub fn display_text(&self) -> &str {
        if self.showing_error {
            ERROR_MARKER
        } else {
            &self.entry
        }
    }

    /// Inserts `c` at the cursor. An error marker is dropped first, so typing
    /// after a failure starts a fresh entry.
    pub fn insert_char(&mut self, c: char) {
        if self.showing_error {
            self.clear();
        }
        if self.entry.len() + c.len_utf8() > MAX_EXPRESSION_LEN {
            self.status_message = Some("Entry is full".to_string());
            return;
        }
        let index = self.byte_index(self.cursor_position);
        self.entry.insert(index, c);
        self.cursor_position += 1;
        self.status_message = None;
    }

    /// Removes the character before the cursor.
    pub fn backspace(&mut self) {
        if self.showing_error {
            self.clear();
            return;
        }
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index(self.cursor_position);
            self.entry.remove(index);
        }
    }

    /// Removes the character under the cursor.
    pub fn delete(&mut self) {
        if self.showing_error {
            self.clear();
            return;
        }
        if self.cursor_position < self.char_count() {
            let index = self.byte_index(self.cursor_position);
            self.entry.remove(index);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.char_count();
    }

    /// Empties the entry and drops the error marker.
    pub fn clear(&mut self) {
        self.entry.clear();
        self.cursor_position = 0;
        self.showing_error = false;
        self.status_message = None;
    }

    /// Evaluates the displayed text, recording it on success.
    pub fn evaluate_entry(&mut self) {
        let expression = self.display_text().to_string();
        match evaluate_and_record(&expression, self.logger.as_ref()) {
            Ok(value) => {
                let result = value.to_string();
                self.push_history(expression, result.clone());
                self.set_entry(result);
                self.status_message = None;
            }
            Err(err) => self.show_error(&err),
        }
    }

    /// Replaces the entry with its negated value. Not recorded.
    pub fn toggle_sign(&mut self) {
        if self.display_text().is_empty() {
            return;
        }
        match evaluate(self.display_text()) {
            Ok(value) => {
                self.set_entry((-value).to_string());
                self.status_message = None;
            }
            Err(err) => self.show_error(&err),
        }
    }

    /// Copies the displayed text to the system clipboard and reports the
    /// outcome in the status bar.
    pub fn copy_display(&mut self) {
        let text = self.display_text().to_string();
        match self.clipboard.copy(&text) {
            Ok(()) => self.set_status(format!("Copied '{text}' to clipboard")),
            Err(err) => self.set_status(err.to_string()),
        }
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            AppMode::Normal => AppMode::Help,
            AppMode::Help => AppMode::Normal,
        };
        self.help_scroll = 0;
    }

    pub fn scroll_help(&mut self, delta: isize) {
        self.help_scroll = self.help_scroll.saturating_add_signed(delta);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    fn set_entry(&mut self, text: String) {
        self.entry = text;
        self.showing_error = false;
        self.move_cursor_end();
    }

    fn show_error(&mut self, err: &EvalError) {
        self.entry.clear();
        self.cursor_position = 0;
        self.showing_error = true;
        self.status_message = Some(err.to_string());
    }

    fn push_history(&mut self, expression: String, result: String) {
        self.history.push_back(HistoryEntry { expression, result });
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    fn char_count(&self) -> usize {
        self.entry.chars().count()
    }

    fn byte_index(&self, char_position: usize) -> usize {
        self.entry
            .char_indices()
            .nth(char_position)
            .map_or(self.entry.len(), |(index, _)| index)
    }
}
