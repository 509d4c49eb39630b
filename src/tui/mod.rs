//! Terminal front end.
//!
//! The runtime loop owns the terminal and the [`App`] display state. One
//! session drive runs per game on a spawned task
//! ([`orchestrator::run`]); this loop drains its events between frames,
//! forwards gestures, and spawns a fresh drive when the user asks for a
//! new game with the same settings.

mod app;
mod input;
pub mod orchestrator;
mod ui;

pub use app::{App, AppCommand};

use crate::cli::Cli;
use crate::engine::http::HttpRulesEngine;
use crate::session::StartConfig;
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use orchestrator::{Gesture, SessionEvent};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Runs the terminal client until the user quits.
pub async fn run(cli: Cli) -> Result<()> {
    // Log to a file so tracing output never tears the alternate screen.
    let log_file = std::fs::File::create("kingside.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(engine_url = %cli.engine_url, "starting terminal client");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &cli).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(error = ?err, "client loop error");
        eprintln!("Error: {err:?}");
    }
    result
}

/// Spawns a session drive for the configured game and hands back the
/// channel ends the loop talks through.
fn spawn_session(
    cli: &Cli,
) -> (
    mpsc::UnboundedSender<Gesture>,
    mpsc::UnboundedReceiver<SessionEvent>,
) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (gesture_tx, gesture_rx) = mpsc::unbounded_channel();

    let engine = Box::new(HttpRulesEngine::new(cli.engine_url.clone()));
    let config = StartConfig {
        position: cli.position.clone(),
        color: cli.color,
        think_time: cli.think_time,
    };

    tokio::spawn(async move {
        if let Err(err) = orchestrator::run(engine, config, event_tx, gesture_rx).await {
            error!(error = ?err, "session drive ended with an error");
        }
    });

    (gesture_tx, event_rx)
}

async fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    cli: &Cli,
) -> Result<()> {
    let mut app = App::new();
    let (mut gesture_tx, mut event_rx) = spawn_session(cli);

    loop {
        while let Ok(session_event) = event_rx.try_recv() {
            app.handle_event(session_event);
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll briefly so pending session events still land between keys.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match app.handle_key(key.code) {
                    Some(AppCommand::Quit) => {
                        info!("user quit");
                        return Ok(());
                    }
                    Some(AppCommand::NewGame) => {
                        info!("starting a new game with the same settings");
                        app = App::new();
                        (gesture_tx, event_rx) = spawn_session(cli);
                    }
                    Some(AppCommand::Submit(from, to)) => {
                        if gesture_tx.send(Gesture { from, to }).is_err() {
                            app.note_session_gone();
                        }
                    }
                    None => {}
                }
            }
        }
    }
}
