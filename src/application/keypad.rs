//! The on-screen keypad: which buttons exist and where they sit.

/// What pressing a keypad button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadKey {
    /// Insert a character at the cursor.
    Input(char),
    /// Evaluate the entry.
    Equals,
    /// Empty the entry.
    Clear,
    /// Remove the character before the cursor.
    Backspace,
    /// Negate the current value.
    ToggleSign,
}

/// A button on the keypad grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeypadButton {
    pub label: &'static str,
    pub key: KeypadKey,
    pub row: u16,
    pub col: u16,
    pub col_span: u16,
}

pub const KEYPAD_ROWS: u16 = 5;
pub const KEYPAD_COLS: u16 = 4;

const fn input(label: &'static str, c: char, row: u16, col: u16) -> KeypadButton {
    KeypadButton { label, key: KeypadKey::Input(c), row, col, col_span: 1 }
}

const fn action(label: &'static str, key: KeypadKey, row: u16, col: u16, col_span: u16) -> KeypadButton {
    KeypadButton { label, key, row, col, col_span }
}

/// Every button, row by row.
pub const KEYPAD: [KeypadButton; 19] = [
    input("7", '7', 0, 0),
    input("8", '8', 0, 1),
    input("9", '9', 0, 2),
    input("/", '/', 0, 3),
    input("4", '4', 1, 0),
    input("5", '5', 1, 1),
    input("6", '6', 1, 2),
    input("*", '*', 1, 3),
    input("1", '1', 2, 0),
    input("2", '2', 2, 1),
    input("3", '3', 2, 2),
    input("-", '-', 2, 3),
    input("0", '0', 3, 0),
    input(".", '.', 3, 1),
    action("=", KeypadKey::Equals, 3, 2, 1),
    input("+", '+', 3, 3),
    action("C", KeypadKey::Clear, 4, 0, 2),
    action("⌫", KeypadKey::Backspace, 4, 2, 1),
    action("±", KeypadKey::ToggleSign, 4, 3, 1),
];

/// The button that produces `key`, if any.
pub fn button_for(key: KeypadKey) -> Option<&'static KeypadButton> {
    KEYPAD.iter().find(|button| button.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_buttons_fit_the_grid() {
        for button in &KEYPAD {
            assert!(button.row < KEYPAD_ROWS, "{}", button.label);
            assert!(button.col + button.col_span <= KEYPAD_COLS, "{}", button.label);
        }
    }

    #[test]
    fn test_no_two_buttons_share_a_cell() {
        let mut cells = HashSet::new();
        for button in &KEYPAD {
            for col in button.col..button.col + button.col_span {
                assert!(cells.insert((button.row, col)), "overlap at {}", button.label);
            }
        }
        assert_eq!(cells.len(), (KEYPAD_ROWS * KEYPAD_COLS) as usize);
    }

    #[test]
    fn test_button_lookup() {
        assert_eq!(button_for(KeypadKey::Clear).map(|b| b.col_span), Some(2));
        assert_eq!(button_for(KeypadKey::Input('5')).map(|b| (b.row, b.col)), Some((1, 1)));
        assert!(button_for(KeypadKey::Input('(')).is_none());
    }
}
