//! Kingside library - terminal chess against a remote rules engine
//!
//! The rules engine on the far side of [`engine::RulesEngine`] owns every
//! chess rule: legality, search, evaluation, draw bookkeeping. This crate
//! owns the front-end half of the game and keeps it honest:
//!
//! - **Session**: the per-game state machine tracking whose turn it is,
//!   the current position, and exactly which moves are legal
//! - **Codec**: castling translation between the board's square pairs and
//!   the engine's `O-O`/`O-O-O` tokens
//! - **Board**: the widget-facing model, from squares and pieces to the
//!   effect list the session emits instead of touching a renderer
//! - **Eval**: projection of raw engine evaluations onto the advantage bar
//! - **Tui**: a ratatui board widget adapter wired to the session
//!
//! # Example
//!
//! ```no_run
//! use kingside::engine::http::HttpRulesEngine;
//! use kingside::{ColorChoice, GameSession, StartConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), kingside::SessionError> {
//! let engine = Box::new(HttpRulesEngine::new("http://127.0.0.1:8000"));
//! let (mut session, first_update) = GameSession::start(
//!     engine,
//!     StartConfig {
//!         position: None,
//!         color: ColorChoice::White,
//!         think_time: Duration::from_secs(3),
//!     },
//! )
//! .await?;
//!
//! let update = session
//!     .submit_user_move("e2".parse().unwrap(), "e4".parse().unwrap())
//!     .await?;
//! # let _ = (first_update, update);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod board;
pub mod cli;
pub mod codec;
pub mod engine;
pub mod eval;
pub mod session;
pub mod tui;

// Crate-level exports - board model
pub use board::{BoardEffect, Color, DisplayBoard, Piece, PieceKind, Square, Verdict};

// Crate-level exports - rules engine boundary
pub use engine::http::HttpRulesEngine;
pub use engine::{EngineError, GameCreated, GameId, RulesEngine, Suggestion, TurnReport};

// Crate-level exports - evaluation display
pub use eval::EvalReading;

// Crate-level exports - session orchestration
pub use session::{
    ColorChoice, GameSession, LegalMoveIndex, SessionError, SessionPhase, SessionUpdate,
    StartConfig, TurnState, START_POSITION,
};
