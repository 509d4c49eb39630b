//! The session-driving task.
//!
//! The turn loop runs on its own task so an engine round-trip never
//! blocks the terminal: the UI pushes gestures over one channel, receives
//! [`SessionEvent`]s over another, and keeps drawing while the engine
//! thinks.

use crate::board::Square;
use crate::engine::RulesEngine;
use crate::session::{GameSession, SessionPhase, SessionUpdate, StartConfig};
use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// Messages sent from the session drive to the UI.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The session started; carries the first render.
    Ready(SessionUpdate),
    /// A ply was applied.
    Update(SessionUpdate),
    /// A suggestion request is outstanding at the engine.
    Thinking,
    /// A gesture was quietly rejected; the piece snaps back.
    Rejected {
        /// Gesture source square.
        from: Square,
        /// Gesture destination square.
        to: Square,
    },
    /// A failure the user must see; the board keeps its prior state.
    Alert(String),
    /// The drive is done: game over, or the session cannot continue.
    Closed,
}

/// A user gesture forwarded from the UI.
#[derive(Debug, Clone, Copy)]
pub struct Gesture {
    /// Square the piece was picked up from.
    pub from: Square,
    /// Square it was dropped on.
    pub to: Square,
}

/// Drives one game session to completion.
///
/// One loop iteration per ply: opponent turns issue exactly one
/// suggestion request, player turns consume exactly one gesture from the
/// channel, so there is never more than one engine request outstanding.
/// A failed user ply keeps the loop alive (the player just tries again);
/// a failed opponent ply ends the drive, and the user starts a fresh game
/// instead of replaying a half-known one.
#[instrument(skip_all)]
pub async fn run(
    engine: Box<dyn RulesEngine>,
    config: StartConfig,
    events: mpsc::UnboundedSender<SessionEvent>,
    mut gestures: mpsc::UnboundedReceiver<Gesture>,
) -> Result<()> {
    let (mut session, first) = match GameSession::start(engine, config).await {
        Ok(started) => started,
        Err(e) => {
            warn!(error = %e, "could not start the game");
            events.send(SessionEvent::Alert(e.to_string()))?;
            events.send(SessionEvent::Closed)?;
            return Ok(());
        }
    };
    events.send(SessionEvent::Ready(first))?;

    loop {
        match session.phase() {
            SessionPhase::Finished => break,
            SessionPhase::AwaitingOpponent => {
                events.send(SessionEvent::Thinking)?;
                match session.request_opponent_move().await {
                    Ok(update) => events.send(SessionEvent::Update(update))?,
                    Err(e) => {
                        warn!(error = %e, "opponent move failed, ending drive");
                        events.send(SessionEvent::Alert(e.to_string()))?;
                        break;
                    }
                }
            }
            SessionPhase::AwaitingPlayer => {
                let Some(Gesture { from, to }) = gestures.recv().await else {
                    info!("gesture channel closed, ending drive");
                    break;
                };
                match session.submit_user_move(from, to).await {
                    Ok(update) => events.send(SessionEvent::Update(update))?,
                    Err(e) if e.is_rejection() => {
                        events.send(SessionEvent::Rejected { from, to })?;
                    }
                    Err(e) => {
                        warn!(error = %e, "user move failed");
                        events.send(SessionEvent::Alert(e.to_string()))?;
                    }
                }
            }
        }
    }

    info!(game = %session.game_id(), "session drive finished");
    events.send(SessionEvent::Closed)?;
    Ok(())
}
