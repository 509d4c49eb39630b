//! The rules-engine boundary.
//!
//! Everything chess-rule-shaped (legality, search, evaluation, draw
//! bookkeeping) lives on the far side of [`RulesEngine`]. The session
//! never decides whether a move is legal; it forwards moves, mirrors the
//! replies, and treats positions as opaque strings. Keeping the boundary a
//! trait lets the terminal client talk to a remote service
//! ([`http::HttpRulesEngine`]) while tests script replies in process.

pub mod http;

use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque token naming one game on the engine side.
///
/// Issued by [`RulesEngine::create_game`], attached verbatim to every
/// later request for that game, and never reused across games.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Wraps a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reply to game creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCreated {
    /// Token for the new game.
    pub session: GameId,
    /// The confirmed starting position.
    pub position: String,
    /// Legal moves in that position, in engine notation.
    pub legal_moves: Vec<String>,
    /// Whether the side to move starts in check.
    pub in_check: bool,
}

/// Reply to a submitted move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReport {
    /// Position after the move.
    pub position: String,
    /// Legal moves for the new side to move, in engine notation.
    pub legal_moves: Vec<String>,
    /// Whether the new side to move is in check.
    pub in_check: bool,
}

/// Reply to a move-suggestion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// The move the engine wants to play, in engine notation.
    #[serde(rename = "move")]
    pub best_move: String,
    /// Raw evaluation of the position from the engine's point of view.
    pub evaluation: String,
}

/// Failure talking to the rules engine.
#[derive(Debug, Clone, Display, Error)]
pub enum EngineError {
    /// The engine could not be reached at all.
    #[display("rules engine unreachable: {detail}")]
    Unreachable {
        /// Transport-level failure description.
        detail: String,
    },
    /// The engine refused the move as illegal.
    #[display("rules engine rejected the move: {reason}")]
    Rejected {
        /// The engine's stated reason.
        reason: String,
    },
    /// The engine answered with something this client cannot read.
    #[display("malformed rules engine reply: {detail}")]
    Protocol {
        /// What was wrong with the reply.
        detail: String,
    },
}

/// Asynchronous boundary to the rules engine.
///
/// Callers await each call before issuing the next for the same game; the
/// session's exclusive borrow enforces that, so implementations never see
/// two in-flight requests for one game.
#[async_trait]
pub trait RulesEngine: Send + Sync {
    /// Creates a game, optionally from a caller-supplied position.
    /// `None` asks the engine for the standard starting position.
    async fn create_game(&self, position: Option<&str>)
        -> Result<GameCreated, EngineError>;

    /// Plays `mv` (engine notation) in game `game`.
    ///
    /// `history` holds every position reached so far, oldest first, up to
    /// and including the current one; the engine appends the post-move
    /// position itself when it checks for repetition.
    async fn submit_move(
        &self,
        game: &GameId,
        mv: &str,
        history: &[String],
    ) -> Result<TurnReport, EngineError>;

    /// Asks for the engine's own move in game `game`, granting it at most
    /// `think_time` to search.
    async fn suggest_move(
        &self,
        game: &GameId,
        history: &[String],
        think_time: Duration,
    ) -> Result<Suggestion, EngineError>;
}
