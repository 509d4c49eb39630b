//! Game-state orchestration.
//!
//! [`GameSession`] is the authoritative front-end record of one game: it
//! owns the turn snapshot and the legal-move index, validates user
//! gestures, runs the request/response cycle with the rules engine, and
//! describes every visual consequence as [`BoardEffect`]s for the widget
//! adapter to apply. All state mutation happens in one commit step per
//! ply, after every fallible part of that ply has succeeded, so a failed
//! operation leaves the session exactly as it was.

use crate::board::{BoardEffect, Color, DisplayBoard, PieceKind, Square, Verdict};
use crate::codec;
use crate::engine::{EngineError, GameId, RulesEngine};
use crate::eval::EvalReading;
use derive_more::{Display, Error, From};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// The standard chess starting position.
pub const START_POSITION: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The user's color selection from the game form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ColorChoice {
    /// Play the white pieces.
    White,
    /// Play the black pieces.
    Black,
    /// Flip a coin at game start.
    Random,
}

impl ColorChoice {
    /// Resolves to a concrete color, flipping the coin for `Random`.
    fn resolve(self) -> Color {
        match self {
            ColorChoice::White => Color::White,
            ColorChoice::Black => Color::Black,
            ColorChoice::Random => {
                if rand::random() {
                    Color::White
                } else {
                    Color::Black
                }
            }
        }
    }
}

/// Everything the game form supplies to start a session.
#[derive(Debug, Clone)]
pub struct StartConfig {
    /// Starting position; `None` means the standard initial position.
    pub position: Option<String>,
    /// Which side the user plays.
    pub color: ColorChoice,
    /// Thinking-time budget granted to the engine per move.
    pub think_time: Duration,
}

/// Where the session stands in the turn cycle.
///
/// There is no stored "uninitialized" phase: [`GameSession::start`] is the
/// transition out of it, and a session value only exists once that
/// transition has fully succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The user's gesture is expected next.
    AwaitingPlayer,
    /// The engine's move is expected next.
    AwaitingOpponent,
    /// No legal moves remain; the game is over.
    Finished,
}

/// Authoritative turn snapshot, replaced as a whole once per ply.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnState {
    /// Side to move.
    pub current_turn: Color,
    /// Side the user plays, fixed for the life of the session.
    pub player_color: Color,
    /// Current position, passed through from the engine verbatim.
    pub position: String,
    /// Whether the side to move is in check.
    pub in_check: bool,
    /// True exactly when no legal moves remain.
    pub finished: bool,
}

impl TurnState {
    /// The phase this snapshot implies.
    pub fn phase(&self) -> SessionPhase {
        if self.finished {
            SessionPhase::Finished
        } else if self.current_turn == self.player_color {
            SessionPhase::AwaitingPlayer
        } else {
            SessionPhase::AwaitingOpponent
        }
    }
}

/// Legal destinations per source square, for exactly one position.
///
/// Rebuilt in full from every engine reply and replaced along with the
/// turn snapshot; nothing is ever patched incrementally. A gesture is
/// playable if and only if its square pair appears here.
#[derive(Debug, Clone, Default)]
pub struct LegalMoveIndex {
    moves: HashMap<Square, Vec<Square>>,
}

impl LegalMoveIndex {
    /// Builds the index from an engine legal-move list.
    ///
    /// Castling tokens become `side_to_move`'s king square pair, so a
    /// castle is playable by dragging the king two squares like any other
    /// move. Entries that cannot be read as a square pair are logged and
    /// skipped rather than poisoning the rest of the list.
    pub fn from_engine_moves(moves: &[String], side_to_move: Color) -> Self {
        let mut index: HashMap<Square, Vec<Square>> = HashMap::new();
        for raw in moves {
            let mv = codec::to_visual_notation(raw, side_to_move);
            let from = mv.get(0..2).and_then(|s| s.parse::<Square>().ok());
            let to = mv.get(2..4).and_then(|s| s.parse::<Square>().ok());
            match (from, to) {
                (Some(from), Some(to)) => index.entry(from).or_default().push(to),
                _ => warn!(%raw, "unreadable legal move from the engine, skipped"),
            }
        }
        Self { moves: index }
    }

    /// True when the side to move has no legal moves.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Number of legal moves indexed.
    pub fn len(&self) -> usize {
        self.moves.values().map(Vec::len).sum()
    }

    /// Whether `(from, to)` is a legal move in the indexed position.
    pub fn permits(&self, from: Square, to: Square) -> bool {
        self.moves.get(&from).is_some_and(|dests| dests.contains(&to))
    }

    /// Legal destinations from `from`; empty when the square has none.
    pub fn destinations(&self, from: Square) -> &[Square] {
        self.moves.get(&from).map_or(&[], Vec::as_slice)
    }
}

/// The result of one completed session operation: the new snapshot, the
/// rebuilt index, the widget instructions in application order, and the
/// engine's evaluation when the operation produced one.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    /// Turn snapshot after the operation.
    pub state: TurnState,
    /// Legal-move index for the new position.
    pub legal: LegalMoveIndex,
    /// Instructions for the board widget.
    pub effects: Vec<BoardEffect>,
    /// Evaluation reading; present at start and on opponent plies.
    pub evaluation: Option<EvalReading>,
}

/// Why a session operation did not happen.
#[derive(Debug, Clone, Display, Error, From)]
pub enum SessionError {
    /// A gesture arrived outside the awaiting-player phase.
    #[display("no player move is expected right now")]
    OutOfTurn,
    /// The gesture is not in the legal-move index; the piece snaps back.
    #[display("{from}{to} is not legal in this position")]
    IllegalMove {
        /// Gesture source square.
        from: Square,
        /// Gesture destination square.
        to: Square,
    },
    /// The engine sent a position this client cannot mirror.
    #[display("unusable position from the rules engine: {detail}")]
    UnusablePosition {
        /// What was wrong with the position string.
        detail: String,
    },
    /// The engine call itself failed.
    #[display("{_0}")]
    #[from]
    Engine(EngineError),
}

impl SessionError {
    /// True for quiet gesture rejections: the piece snaps back and play
    /// continues, no alert needed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SessionError::OutOfTurn | SessionError::IllegalMove { .. }
        )
    }
}

/// One game against the rules engine.
pub struct GameSession {
    engine: Box<dyn RulesEngine>,
    game: GameId,
    state: TurnState,
    index: LegalMoveIndex,
    history: Vec<String>,
    mirror: DisplayBoard,
    think_time: Duration,
}

impl GameSession {
    /// Starts a game: creates it on the engine, establishes the turn
    /// snapshot from the confirmed position, and returns the session with
    /// its first update (initial render, orientation, any starting check
    /// highlight).
    ///
    /// On failure nothing exists, no session value and no partial state;
    /// the caller reports the error and leaves the board inert.
    #[instrument(skip(engine, config), fields(color = ?config.color))]
    pub async fn start(
        engine: Box<dyn RulesEngine>,
        config: StartConfig,
    ) -> Result<(Self, SessionUpdate), SessionError> {
        let player_color = config.color.resolve();
        info!(player = %player_color, "starting a new game");

        let created = engine.create_game(config.position.as_deref()).await?;
        let current_turn = side_to_move(&created.position)?;
        let mirror = DisplayBoard::from_fen(&created.position).map_err(|e| {
            SessionError::UnusablePosition {
                detail: e.to_string(),
            }
        })?;
        let index = LegalMoveIndex::from_engine_moves(&created.legal_moves, current_turn);

        let state = TurnState {
            current_turn,
            player_color,
            position: created.position.clone(),
            in_check: created.in_check,
            finished: index.is_empty(),
        };

        let mut effects = vec![BoardEffect::Render {
            position: state.position.clone(),
            orientation: player_color,
        }];
        if state.in_check {
            if let Some(king) = mirror.king_square(current_turn) {
                effects.push(BoardEffect::HighlightCheck { king });
            }
        }
        if let Some(verdict) = verdict(&state) {
            effects.push(BoardEffect::Announce(verdict));
        }

        let session = Self {
            engine,
            game: created.session,
            state: state.clone(),
            index,
            history: vec![created.position],
            mirror,
            think_time: config.think_time,
        };
        info!(game = %session.game, turn = %current_turn, "game started");

        let update = SessionUpdate {
            legal: session.index.clone(),
            state,
            effects,
            evaluation: Some(EvalReading::neutral()),
        };
        Ok((session, update))
    }

    /// Current phase, derived from the turn snapshot.
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// The current turn snapshot.
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// The engine's token for this game.
    pub fn game_id(&self) -> &GameId {
        &self.game
    }

    /// Number of legal moves in the current position.
    pub fn legal_move_count(&self) -> usize {
        self.index.len()
    }

    /// Legal destinations from `from` in the current position.
    pub fn legal_destinations(&self, from: Square) -> &[Square] {
        self.index.destinations(from)
    }

    /// Validates and plays a user gesture.
    ///
    /// Rejected without touching any state when the session is not
    /// awaiting the player or the square pair is not in the legal-move
    /// index. A pawn dropped on a back rank promotes to a queen; the
    /// front end never prompts for a piece.
    #[instrument(skip(self), fields(game = %self.game))]
    pub async fn submit_user_move(
        &mut self,
        from: Square,
        to: Square,
    ) -> Result<SessionUpdate, SessionError> {
        if self.phase() != SessionPhase::AwaitingPlayer {
            debug!(%from, %to, phase = ?self.phase(), "gesture outside the player's turn");
            return Err(SessionError::OutOfTurn);
        }
        if !self.index.permits(from, to) {
            debug!(%from, %to, "gesture not in the legal-move index");
            return Err(SessionError::IllegalMove { from, to });
        }

        let mut mv = format!("{from}{to}");
        let moving_pawn = self
            .mirror
            .piece_at(from)
            .is_some_and(|piece| piece.kind == PieceKind::Pawn);
        if moving_pawn && to.is_back_rank() {
            mv.push('q');
        }

        self.apply_move(&mv).await
    }

    /// Asks the engine for its move and plays it.
    ///
    /// Callable only while awaiting the opponent. The call may take up to
    /// the thinking-time budget; the exclusive borrow plus the sequential
    /// driver mean there is never a second outstanding request, and an
    /// issued request is never cancelled.
    #[instrument(skip(self), fields(game = %self.game))]
    pub async fn request_opponent_move(&mut self) -> Result<SessionUpdate, SessionError> {
        if self.phase() != SessionPhase::AwaitingOpponent {
            return Err(SessionError::OutOfTurn);
        }

        let suggestion = self
            .engine
            .suggest_move(&self.game, &self.history, self.think_time)
            .await?;
        info!(
            best_move = %suggestion.best_move,
            evaluation = %suggestion.evaluation,
            "engine chose its move"
        );

        let mut update = self.apply_move(&suggestion.best_move).await?;
        update.evaluation = Some(EvalReading::from_raw(&suggestion.evaluation));
        Ok(update)
    }

    /// Plays one ply through the engine and commits it.
    ///
    /// Accepts either notation: the move is normalized to visual form for
    /// highlighting and to engine notation for the wire, keyed on the
    /// side making it. An engine-originated castle therefore round-trips
    /// through both notations once, which keeps a single code path for
    /// both move sources.
    ///
    /// Nothing is written until the engine reply, the refreshed mirror,
    /// and the new index are all in hand; a failure anywhere means the
    /// ply did not happen.
    async fn apply_move(&mut self, mv: &str) -> Result<SessionUpdate, SessionError> {
        let mover = self.state.current_turn;
        let visual = codec::to_visual_notation(mv, mover);
        let wire = codec::to_engine_notation(&visual, mover);
        debug!(%visual, %wire, "playing ply");

        let report = self
            .engine
            .submit_move(&self.game, &wire, &self.history)
            .await?;

        let next_turn = mover.opponent();
        let mirror = DisplayBoard::from_fen(&report.position).map_err(|e| {
            SessionError::UnusablePosition {
                detail: e.to_string(),
            }
        })?;
        let index = LegalMoveIndex::from_engine_moves(&report.legal_moves, next_turn);

        // Commit. Everything fallible is behind us.
        self.state = TurnState {
            current_turn: next_turn,
            player_color: self.state.player_color,
            position: report.position.clone(),
            in_check: report.in_check,
            finished: index.is_empty(),
        };
        self.history.push(report.position);
        self.index = index;
        self.mirror = mirror;

        Ok(self.ply_update(&visual))
    }

    /// Builds the post-ply update: fresh render, last-move highlight,
    /// check highlight, and the verdict once no moves remain.
    fn ply_update(&self, visual: &str) -> SessionUpdate {
        let mut effects = vec![
            BoardEffect::ClearHighlights,
            BoardEffect::Render {
                position: self.state.position.clone(),
                orientation: self.state.player_color,
            },
        ];
        if let Some((from, to)) = split_squares(visual) {
            effects.push(BoardEffect::HighlightLastMove { from, to });
        }
        if self.state.in_check {
            if let Some(king) = self.mirror.king_square(self.state.current_turn) {
                effects.push(BoardEffect::HighlightCheck { king });
            }
        }
        if let Some(verdict) = verdict(&self.state) {
            info!(?verdict, "game over");
            effects.push(BoardEffect::Announce(verdict));
        }

        SessionUpdate {
            state: self.state.clone(),
            legal: self.index.clone(),
            effects,
            evaluation: None,
        }
    }
}

/// Reads the side to move from a position string (second field, `w` or
/// `b`).
fn side_to_move(position: &str) -> Result<Color, SessionError> {
    match position.split_whitespace().nth(1) {
        Some("w") => Ok(Color::White),
        Some("b") => Ok(Color::Black),
        other => Err(SessionError::UnusablePosition {
            detail: format!("side-to-move field is {other:?}"),
        }),
    }
}

/// Splits a visual move into its square pair, if it has one.
fn split_squares(mv: &str) -> Option<(Square, Square)> {
    let from = mv.get(0..2)?.parse().ok()?;
    let to = mv.get(2..4)?.parse().ok()?;
    Some((from, to))
}

/// The verdict implied by a finished snapshot: checkmate when the stuck
/// side is in check, stalemate otherwise.
fn verdict(state: &TurnState) -> Option<Verdict> {
    if !state.finished {
        return None;
    }
    Some(if state.in_check {
        Verdict::Checkmate {
            winner: state.current_turn.opponent(),
        }
    } else {
        Verdict::Stalemate
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn moves(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn index_maps_sources_to_destinations() {
        let index =
            LegalMoveIndex::from_engine_moves(&moves(&["e2e4", "e2e3", "g1f3"]), Color::White);
        assert_eq!(index.len(), 3);
        assert!(index.permits(sq("e2"), sq("e4")));
        assert!(index.permits(sq("g1"), sq("f3")));
        assert!(!index.permits(sq("e2"), sq("e5")));
        assert!(!index.permits(sq("a1"), sq("a2")));

        let mut dests = index.destinations(sq("e2")).to_vec();
        dests.sort();
        assert_eq!(dests, vec![sq("e3"), sq("e4")]);
        assert!(index.destinations(sq("h8")).is_empty());
    }

    #[test]
    fn index_translates_castles_for_the_side_to_move() {
        let white =
            LegalMoveIndex::from_engine_moves(&moves(&["O-O", "O-O-O", "e1d1"]), Color::White);
        assert!(white.permits(sq("e1"), sq("g1")));
        assert!(white.permits(sq("e1"), sq("c1")));
        assert!(white.permits(sq("e1"), sq("d1")));

        let black = LegalMoveIndex::from_engine_moves(&moves(&["O-O"]), Color::Black);
        assert!(black.permits(sq("e8"), sq("g8")));
        assert!(!black.permits(sq("e1"), sq("g1")));
    }

    #[test]
    fn index_skips_unreadable_entries() {
        let index = LegalMoveIndex::from_engine_moves(
            &moves(&["e2e4", "resign", "x9y0", ""]),
            Color::White,
        );
        assert_eq!(index.len(), 1);
        assert!(index.permits(sq("e2"), sq("e4")));
    }

    #[test]
    fn empty_index_means_no_moves() {
        let index = LegalMoveIndex::from_engine_moves(&[], Color::White);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn side_to_move_reads_the_second_field() {
        assert_eq!(side_to_move(START_POSITION).unwrap(), Color::White);
        assert_eq!(
            side_to_move("8/8/8/8/8/8/8/8 b - - 0 1").unwrap(),
            Color::Black
        );
        assert!(side_to_move("rnbqkbnr/pppppppp/8/8").is_err());
        assert!(side_to_move("").is_err());
    }

    #[test]
    fn phases_follow_turn_and_finish() {
        let mut state = TurnState {
            current_turn: Color::White,
            player_color: Color::White,
            position: START_POSITION.to_string(),
            in_check: false,
            finished: false,
        };
        assert_eq!(state.phase(), SessionPhase::AwaitingPlayer);

        state.current_turn = Color::Black;
        assert_eq!(state.phase(), SessionPhase::AwaitingOpponent);

        state.finished = true;
        assert_eq!(state.phase(), SessionPhase::Finished);
    }

    #[test]
    fn verdict_requires_a_finished_state() {
        let mut state = TurnState {
            current_turn: Color::Black,
            player_color: Color::White,
            position: START_POSITION.to_string(),
            in_check: true,
            finished: false,
        };
        assert_eq!(verdict(&state), None);

        state.finished = true;
        assert_eq!(
            verdict(&state),
            Some(Verdict::Checkmate {
                winner: Color::White
            })
        );

        state.in_check = false;
        assert_eq!(verdict(&state), Some(Verdict::Stalemate));
    }

    #[test]
    fn split_squares_reads_the_leading_pair() {
        assert_eq!(split_squares("e2e4"), Some((sq("e2"), sq("e4"))));
        assert_eq!(split_squares("e7e8q"), Some((sq("e7"), sq("e8"))));
        assert_eq!(split_squares("O-O"), None);
        assert_eq!(split_squares("e2"), None);
    }
}
