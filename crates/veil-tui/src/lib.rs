mod app;
mod ui;

pub use app::App;

use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

pub async fn run(store: veil_store::SqliteStore) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(store).await?;

    // Run the app
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Paste(text) => {
                if app.input_mode == app::InputMode::Composing {
                    app.compose_paste(&text);
                }
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                use app::InputMode;

                match app.input_mode {
                    InputMode::Normal => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('j') | KeyCode::Down => app.next(),
                        KeyCode::Char('k') | KeyCode::Up => app.previous(),
                        KeyCode::Char(' ') => app.toggle_selected().await?,
                        KeyCode::Char('a') => app.start_add_rule(),
                        KeyCode::Char('d') => app.start_delete(),
                        KeyCode::Char('i') | KeyCode::Enter => app.start_compose(),
                        KeyCode::Char('r') => app.refresh().await?,
                        KeyCode::Char('y') => app.copy_restored(),
                        _ => {}
                    },
                    InputMode::Composing => match key.code {
                        KeyCode::Esc => app.cancel_input(),
                        KeyCode::Backspace => app.compose_backspace(),
                        KeyCode::Enter => app.compose_char('\n'),
                        KeyCode::Left => app.compose_caret_left(),
                        KeyCode::Right => app.compose_caret_right(),
                        KeyCode::Char(c) => app.compose_char(c),
                        _ => {}
                    },
                    InputMode::AddingRule => match key.code {
                        KeyCode::Enter => app.confirm_add_rule().await?,
                        KeyCode::Esc => app.cancel_input(),
                        KeyCode::Backspace => app.input_backspace(),
                        KeyCode::Char(c) => app.input_char(c),
                        _ => {}
                    },
                    InputMode::ConfirmDelete => match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete().await?,
                        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                            app.cancel_input()
                        }
                        _ => {}
                    },
                }
            }
            _ => {}
        }
    }
}
