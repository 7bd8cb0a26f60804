use crate::application::{App, AppMode, KEYPAD, KEYPAD_COLS, KEYPAD_ROWS, KeypadButton, KeypadKey};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// The regions of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub display: Rect,
    pub keypad: Rect,
    pub history: Rect,
    pub status: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    ScreenLayout {
        header: chunks[0],
        display: chunks[1],
        keypad: body[0],
        history: body[1],
        status: chunks[3],
    }
}

/// Screen rectangle of every keypad button inside the keypad panel.
pub fn keypad_cells(keypad: Rect) -> Vec<(Rect, &'static KeypadButton)> {
    let inner = Block::default().borders(Borders::ALL).inner(keypad);
    let cell_width = inner.width / KEYPAD_COLS;
    let cell_height = inner.height / KEYPAD_ROWS;

    KEYPAD
        .iter()
        .map(|button| {
            let rect = Rect {
                x: inner.x + button.col * cell_width,
                y: inner.y + button.row * cell_height,
                width: cell_width * button.col_span,
                height: cell_height,
            };
            (rect, button)
        })
        .collect()
}

/// The keypad button under the terminal cell (`column`, `row`) of a frame
/// covering `area`.
pub fn keypad_button_at(area: Rect, column: u16, row: u16) -> Option<&'static KeypadButton> {
    keypad_cells(screen_layout(area).keypad)
        .into_iter()
        .find(|(rect, _)| {
            column >= rect.x
                && column < rect.x + rect.width
                && row >= rect.y
                && row < rect.y + rect.height
        })
        .map(|(_, button)| button)
}

pub fn render_ui(f: &mut Frame, app: &App) {
    let layout = screen_layout(f.area());

    render_header(f, layout.header);
    render_display(f, app, layout.display);
    render_keypad(f, app, layout.keypad);
    render_history(f, app, layout.history);
    render_status_bar(f, app, layout.status);

    if app.mode == AppMode::Help {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new("tcalc - Terminal Calculator")
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_display(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Display");
    let inner = block.inner(area);
    let width = inner.width as usize;

    // Keep the cursor in view when the entry is wider than the panel.
    let offset = app.cursor_position.saturating_sub(width.saturating_sub(1));

    let style = if app.showing_error {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let display = Paragraph::new(app.display_text())
        .block(block)
        .style(style)
        .scroll((0, offset as u16));
    f.render_widget(display, area);

    if app.mode == AppMode::Normal && !app.showing_error && inner.width > 0 {
        let x = inner.x + (app.cursor_position - offset) as u16;
        f.set_cursor_position((x, inner.y));
    }
}

fn button_style(key: KeypadKey, pressed: bool) -> Style {
    if pressed {
        return Style::default().bg(Color::LightBlue).fg(Color::Black);
    }
    match key {
        KeypadKey::Input(c) if c.is_ascii_digit() || c == '.' => Style::default().fg(Color::White),
        KeypadKey::Input(_) => Style::default().fg(Color::Yellow),
        KeypadKey::Equals => Style::default().fg(Color::Green),
        KeypadKey::Clear => Style::default().fg(Color::Red),
        KeypadKey::Backspace | KeypadKey::ToggleSign => Style::default().fg(Color::Magenta),
    }
}

fn render_keypad(f: &mut Frame, app: &App, area: Rect) {
    f.render_widget(Block::default().borders(Borders::ALL).title("Keypad"), area);

    for (rect, button) in keypad_cells(area) {
        if rect.width == 0 || rect.height == 0 {
            continue;
        }
        let pressed = app.last_key == Some(button.key);
        let padding = rect.height.saturating_sub(3) / 2;
        let mut lines = vec![Line::from(""); padding as usize];
        lines.push(Line::from(button.label));

        let widget = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .style(button_style(button.key, pressed));
        f.render_widget(widget, rect);
    }
}

fn render_history(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("History");
    let visible = block.inner(area).height as usize;

    let skip = app.history.len().saturating_sub(visible);
    let lines: Vec<Line> = app
        .history
        .iter()
        .skip(skip)
        .map(|entry| Line::from(format!("{} = {}", entry.expression, entry.result)))
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        AppMode::Normal => match &app.status_message {
            Some(status) => status.clone(),
            None => "Enter: evaluate | Esc: clear | Ctrl+N: ± | Ctrl+Y: copy | F1: help | Ctrl+Q: quit"
                .to_string(),
        },
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
    };

    let style = match app.mode {
        AppMode::Normal if app.showing_error => Style::default().fg(Color::Red),
        AppMode::Normal => Style::default(),
        AppMode::Help => Style::default().fg(Color::Cyan),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let help_widget = Paragraph::new(help_lines[start_line..end_line].join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("tcalc Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"TCALC EXPRESSION REFERENCE

=== NUMBERS ===
Integers have no size limit          2**100 → 1267650600228229401496703205376
Decimals and exponents               3.14, .5, 1e3, 2.5E-3
Any division gives a decimal         15/3 → 5.0

=== OPERATORS (loosest first) ===
+  -        Addition, subtraction        10-4-3 → 3
*  /        Multiplication, division     10/4 → 2.5
//          Floor division               -7//2 → -4
%           Remainder (sign of divisor)  -7%2 → 1
-x  +x      Sign
**          Power (right to left)        2**3**2 → 512, -2**2 → -4
( )         Grouping                     (2+3)*4 → 20

Anything else (names, functions, comparisons) shows Error.
Division by zero shows Error. Failed results are not logged.

=== KEYS ===
0-9 . + - * / % ( )   Type into the entry
Enter or =      Evaluate
Backspace       Delete before the cursor
Delete          Delete under the cursor
Esc             Clear the entry
← → Home End    Move the cursor
Ctrl+N          Toggle the sign of the current value
Ctrl+Y          Copy the display to the clipboard
Mouse click     Press a keypad button
F1              Show this help
Ctrl+Q/Ctrl+C   Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/q        Close this help window

Successful evaluations are appended to the CSV log
(calculator_log.csv unless configured otherwise)."#;
