use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::RunConfig;
use crate::coordinator::{MemorySink, RunCoordinator, RunSummary};

use super::app::App;
use super::models::ConfigInputMode;
use super::rendering::ui;

/// Opens the form, pre-filled from `config`, and returns the summary of the
/// last run performed before the user quit.
pub async fn run_tui(config: RunConfig) -> anyhow::Result<Option<RunSummary>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::with_config(&config);
    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(app.summary)
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.clear_status_message_if_expired();
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if app.show_help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('q')
            ) {
                app.toggle_help();
            }
            continue;
        }

        if app.show_config {
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Enter if app.config_input_mode == ConfigInputMode::Confirm => {
                    let sink = MemorySink::new();
                    match app.load_preview(&sink) {
                        Ok(()) => {
                            if let Some(event) = sink.events().pop() {
                                app.set_status_message(event.message);
                            }
                        }
                        Err(err) => app.set_status_message(err.to_string()),
                    }
                }
                KeyCode::Enter => app.advance_config_step(),
                KeyCode::Backspace => app.handle_backspace(),
                KeyCode::Char('h') if !app.config_input_mode.accepts_text() => app.toggle_help(),
                KeyCode::Char(c) => app.handle_config_input(c),
                other => app.handle_config_navigation(other),
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Char('h') => app.toggle_help(),
            KeyCode::Char('p') => app.toggle_preview(),
            KeyCode::Char('c') => {
                app.show_config = true;
                app.config_input_mode = ConfigInputMode::Source;
            }
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Enter if !app.finished => {
                app.set_status_message("Transferring...".to_string());
                terminal.draw(|f| ui(f, app))?;
                run_transfer(app).await;
            }
            _ => {}
        }
    }
}

async fn run_transfer(app: &mut App) {
    let config = app.run_config();
    let sink = Arc::new(MemorySink::new());
    let worker_sink = Arc::clone(&sink);

    let joined = tokio::task::spawn_blocking(move || {
        RunCoordinator::new(config, worker_sink.as_ref()).run()
    })
    .await;

    match joined {
        Ok(Ok(report)) => {
            let message = format!(
                "{} of {} files done",
                report.summary.total_succeeded, report.summary.total_attempted
            );
            app.apply_report(report);
            app.set_status_message(message);
        }
        Ok(Err(err)) => app.set_status_message(err.to_string()),
        Err(err) => app.set_status_message(format!("transfer task failed: {err}")),
    }
}
