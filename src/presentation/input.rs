use crate::application::{App, AppMode, KeypadKey, button_for};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::Rect;

use super::ui::keypad_button_at;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            app.should_quit = true;
            return;
        }

        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    /// Handles a left click at terminal cell (`column`, `row`) of a frame
    /// covering `area`.
    pub fn handle_mouse_click(app: &mut App, area: Rect, column: u16, row: u16) {
        if app.mode == AppMode::Help {
            app.toggle_help();
            return;
        }
        if let Some(button) = keypad_button_at(area, column, row) {
            app.press(button.key);
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('n') => app.press(KeypadKey::ToggleSign),
                KeyCode::Char('y') => app.copy_display(),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Enter | KeyCode::Char('=') => app.press(KeypadKey::Equals),
            KeyCode::Backspace => app.press(KeypadKey::Backspace),
            KeyCode::Delete => app.delete(),
            KeyCode::Esc => app.press(KeypadKey::Clear),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::F(1) => app.toggle_help(),
            KeyCode::Char(c) => {
                let key = KeypadKey::Input(c);
                if button_for(key).is_some() {
                    app.press(key);
                } else {
                    app.insert_char(c);
                }
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => app.toggle_help(),
            KeyCode::Up | KeyCode::Char('k') => app.scroll_help(-1),
            KeyCode::Down | KeyCode::Char('j') => app.scroll_help(1),
            KeyCode::PageUp => app.scroll_help(-5),
            KeyCode::PageDown => app.scroll_help(5),
            KeyCode::Home => app.help_scroll = 0,
            _ => {}
        }
    }
}
