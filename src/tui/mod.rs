pub mod app;
pub mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::Config;
use crate::events::DirectorEvent;
use crate::server::RequestOutbox;
use app::App;

pub async fn run(
    config: &Config,
    outbox: RequestOutbox,
    mut events: UnboundedReceiver<DirectorEvent>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(outbox, config);
    let tick = Duration::from_millis(config.tick_rate_ms);

    let res = run_app(&mut terminal, &mut app, &mut events, tick).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut UnboundedReceiver<DirectorEvent>,
    tick: Duration,
) -> Result<()> {
    loop {
        // Apply everything the receiver queued since the last tick
        app.drain_events(events);

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            if app.agent_ip_input.is_some() {
                match key.code {
                    KeyCode::Enter => app.submit_add_agent(),
                    KeyCode::Esc => app.cancel_add_agent(),
                    KeyCode::Backspace => app.pop_agent_ip_char(),
                    KeyCode::Char(c) => app.push_agent_ip_char(c),
                    _ => {}
                }
                continue;
            }

            if app.pending_disconnect.is_some() {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => app.resolve_disconnect(true),
                    KeyCode::Char('n') | KeyCode::Esc => app.resolve_disconnect(false),
                    _ => {}
                }
                continue;
            }

            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('p') => app.toggle_pause(),
                KeyCode::Char('x') => app.activate_disconnect(),
                KeyCode::Char('a') => app.begin_add_agent(),
                KeyCode::Enter | KeyCode::Char(' ') => app.activate_header(),
                KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
                KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                _ => {}
            }
        }
    }
}
