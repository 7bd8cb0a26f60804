//! tcalc - Terminal Calculator
//!
//! A keypad calculator for the terminal. Run without a command for the
//! interactive keypad, or use `tcalc eval` / `tcalc history` from scripts.

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::Rect,
};
use std::io;
use std::process::ExitCode;

use tcalc::application::App;
use tcalc::infrastructure::{CalcConfig, EvaluationLogger};
use tcalc::presentation::{InputHandler, render_ui};

mod cli;

use cli::{Args, Command};

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    cli::init_tracing(args.default_log_level())?;

    let config = args.apply(CalcConfig::load().context("failed to load configuration")?);
    tracing::info!(
        log_path = %config.log_path.display(),
        logging_enabled = config.logging_enabled,
        history_size = config.history_size,
        "configuration loaded"
    );
    let logger = cli::logger_for(&config);

    match &args.command {
        Some(Command::Eval { expression, json }) => cli::run_eval(expression, *json, logger.as_ref()),
        Some(Command::History { limit, json }) => {
            let logger = logger.unwrap_or_else(|| EvaluationLogger::new(config.log_path.clone()));
            cli::run_history(&logger, *limit, *json)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            run_keypad(App::new(logger, config.history_size))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Sets up the terminal, runs the keypad until the user quits, and restores
/// the terminal even when the event loop fails.
fn run_keypad(mut app: App) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("terminal event loop failed")
}

/// Main application event loop.
///
/// Renders a frame, then waits for one key press or mouse click. Mouse
/// clicks are hit-tested against the frame that was just drawn.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        let mut frame_area = Rect::default();
        terminal.draw(|f| {
            frame_area = f.area();
            render_ui(f, app);
        })?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                InputHandler::handle_key_event(app, key.code, key.modifiers);
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                InputHandler::handle_mouse_click(app, frame_area, mouse.column, mouse.row);
            }
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
