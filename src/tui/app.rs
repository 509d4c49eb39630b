//! Application state behind the terminal widget.
//!
//! [`App`] is the widget side of the board: it applies the session's
//! [`BoardEffect`]s to a local display board, keeps the latest snapshot
//! and legal-move index for gesture gating and hints, and turns key
//! presses into commands for the runtime loop. It never talks to the
//! engine and never decides legality beyond "is this pair in the index".

use crate::board::{BoardEffect, Color, DisplayBoard, Square, Verdict};
use crate::eval::EvalReading;
use crate::session::{LegalMoveIndex, SessionPhase, SessionUpdate, TurnState};
use crossterm::event::KeyCode;
use tracing::{debug, warn};

use super::input;
use super::orchestrator::SessionEvent;

/// What the key handler wants the runtime loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Leave the program.
    Quit,
    /// Start a fresh game with the same settings.
    NewGame,
    /// Forward a gesture to the session drive.
    Submit(Square, Square),
}

/// Main application state.
pub struct App {
    board: DisplayBoard,
    orientation: Color,
    state: Option<TurnState>,
    legal: LegalMoveIndex,
    last_move: Option<(Square, Square)>,
    check: Option<Square>,
    verdict: Option<Verdict>,
    eval: EvalReading,
    status: String,
    alert: Option<String>,
    thinking: bool,
    closed: bool,
    cursor: Square,
    picked: Option<Square>,
}

impl App {
    /// Creates the pre-game state: blank board, even evaluation.
    pub fn new() -> Self {
        Self {
            board: DisplayBoard::default(),
            orientation: Color::White,
            state: None,
            legal: LegalMoveIndex::default(),
            last_move: None,
            check: None,
            verdict: None,
            eval: EvalReading::neutral(),
            status: "Reaching the rules engine...".to_string(),
            alert: None,
            thinking: false,
            closed: false,
            cursor: Square::default(),
            picked: None,
        }
    }

    /// The displayed piece layout.
    pub fn board(&self) -> &DisplayBoard {
        &self.board
    }

    /// Side shown at the bottom of the board.
    pub fn orientation(&self) -> Color {
        self.orientation
    }

    /// The latest turn snapshot, once a game has started.
    pub fn state(&self) -> Option<&TurnState> {
        self.state.as_ref()
    }

    /// Square the cursor sits on.
    pub fn cursor(&self) -> Square {
        self.cursor
    }

    /// Square of the currently picked-up piece, if any.
    pub fn picked(&self) -> Option<Square> {
        self.picked
    }

    /// The two squares of the last played move, if any.
    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.last_move
    }

    /// Square of a checked king to highlight, if any.
    pub fn check(&self) -> Option<Square> {
        self.check
    }

    /// The announced game result, if any.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    /// The current evaluation reading.
    pub fn eval(&self) -> &EvalReading {
        &self.eval
    }

    /// One-line status text.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// A failure message the user must see, if any.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// True while a suggestion request is outstanding.
    pub fn thinking(&self) -> bool {
        self.thinking
    }

    /// Legal destinations to mark: the picked piece's, or the hovered
    /// square's when nothing is picked.
    pub fn hints(&self) -> &[Square] {
        self.legal.destinations(self.picked.unwrap_or(self.cursor))
    }

    /// Applies a session event to the display state.
    pub fn handle_event(&mut self, event: SessionEvent) {
        debug!(?event, "session event");
        match event {
            SessionEvent::Ready(update) => {
                self.apply_update(update);
                self.cursor = home_cursor(self.orientation);
            }
            SessionEvent::Update(update) => self.apply_update(update),
            SessionEvent::Thinking => {
                self.thinking = true;
                self.refresh_status();
            }
            SessionEvent::Rejected { from, to } => {
                self.picked = None;
                self.status = format!("{from}{to} is not allowed, piece returned");
            }
            SessionEvent::Alert(message) => {
                self.alert = Some(message);
            }
            SessionEvent::Closed => {
                self.closed = true;
                self.refresh_status();
            }
        }
    }

    /// Turns a key press into display mutation and, possibly, a command
    /// for the runtime loop.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<AppCommand> {
        match key {
            KeyCode::Char('q') => return Some(AppCommand::Quit),
            KeyCode::Char('n') if self.closed => return Some(AppCommand::NewGame),
            KeyCode::Esc => {
                self.picked = None;
                self.refresh_status();
            }
            KeyCode::Enter | KeyCode::Char(' ') => return self.select(),
            other => {
                self.cursor = input::move_cursor(self.cursor, other, self.orientation);
            }
        }
        None
    }

    fn apply_update(&mut self, update: SessionUpdate) {
        self.thinking = false;
        self.picked = None;
        self.legal = update.legal;
        if let Some(reading) = update.evaluation {
            self.eval = reading;
        }
        for effect in &update.effects {
            self.apply_effect(effect);
        }
        self.state = Some(update.state);
        self.refresh_status();
    }

    fn apply_effect(&mut self, effect: &BoardEffect) {
        match effect {
            BoardEffect::Render {
                position,
                orientation,
            } => {
                match DisplayBoard::from_fen(position) {
                    Ok(board) => self.board = board,
                    Err(e) => warn!(error = %e, "unrenderable position, keeping the old one"),
                }
                self.orientation = *orientation;
            }
            BoardEffect::ClearHighlights => {
                self.last_move = None;
                self.check = None;
            }
            BoardEffect::HighlightLastMove { from, to } => {
                self.last_move = Some((*from, *to));
            }
            BoardEffect::HighlightCheck { king } => self.check = Some(*king),
            BoardEffect::Announce(verdict) => self.verdict = Some(*verdict),
        }
    }

    /// Handles pick-up and drop on the cursor square.
    ///
    /// Pick-up is gated here so a gesture cannot even begin during the
    /// opponent's turn or after the game; the session applies the same
    /// gate again on its side.
    fn select(&mut self) -> Option<AppCommand> {
        let state = self.state.as_ref()?;
        match self.picked {
            None => {
                if self.closed || state.phase() != SessionPhase::AwaitingPlayer {
                    self.status = "Not your turn.".to_string();
                    return None;
                }
                let own_piece = self
                    .board
                    .piece_at(self.cursor)
                    .is_some_and(|piece| piece.color == state.player_color);
                if !own_piece {
                    self.status = "Pick one of your own pieces.".to_string();
                    return None;
                }
                self.picked = Some(self.cursor);
                self.status = format!("Picked {}. Choose a destination.", self.cursor);
                None
            }
            Some(from) if from == self.cursor => {
                self.picked = None;
                self.refresh_status();
                None
            }
            Some(from) => {
                let to = self.cursor;
                self.picked = None;
                if !self.legal.permits(from, to) {
                    self.status = format!("{from}{to} is not allowed, piece returned");
                    return None;
                }
                Some(AppCommand::Submit(from, to))
            }
        }
    }

    /// Marks the session drive as gone so gestures stop being offered.
    pub fn note_session_gone(&mut self) {
        self.closed = true;
        if self.alert.is_none() {
            self.alert = Some("The game session ended unexpectedly.".to_string());
        }
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        self.status = match (&self.verdict, &self.state) {
            (Some(Verdict::Checkmate { winner }), Some(state)) => {
                if *winner == state.player_color {
                    "Checkmate. You win! Press 'n' for a new game, 'q' to quit.".to_string()
                } else {
                    "Checkmate. You lose. Press 'n' for a new game, 'q' to quit.".to_string()
                }
            }
            (Some(Verdict::Stalemate), _) => {
                "Stalemate. Press 'n' for a new game, 'q' to quit.".to_string()
            }
            (None, _) if self.closed => {
                "Session over. Press 'n' for a new game, 'q' to quit.".to_string()
            }
            (None, Some(state)) => match state.phase() {
                SessionPhase::AwaitingPlayer if state.in_check => {
                    "Your move. You are in check!".to_string()
                }
                SessionPhase::AwaitingPlayer => "Your move.".to_string(),
                SessionPhase::AwaitingOpponent if self.thinking => {
                    "Engine is thinking...".to_string()
                }
                SessionPhase::AwaitingOpponent => "Waiting for the engine.".to_string(),
                SessionPhase::Finished => "Game over.".to_string(),
            },
            (_, None) => "Reaching the rules engine...".to_string(),
        };
    }
}

/// Starting cursor square: the player's king pawn square.
fn home_cursor(orientation: Color) -> Square {
    let rank = match orientation {
        Color::White => 1,
        Color::Black => 6,
    };
    Square::new(4, rank).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EvalReading;
    use crate::session::START_POSITION;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn ready_update(player: Color) -> SessionUpdate {
        let state = TurnState {
            current_turn: Color::White,
            player_color: player,
            position: START_POSITION.to_string(),
            in_check: false,
            finished: false,
        };
        SessionUpdate {
            legal: LegalMoveIndex::from_engine_moves(
                &["e2e4".to_string(), "e2e3".to_string(), "g1f3".to_string()],
                Color::White,
            ),
            state,
            effects: vec![BoardEffect::Render {
                position: START_POSITION.to_string(),
                orientation: player,
            }],
            evaluation: Some(EvalReading::neutral()),
        }
    }

    #[test]
    fn ready_event_renders_and_orients() {
        let mut app = App::new();
        app.handle_event(SessionEvent::Ready(ready_update(Color::Black)));
        assert_eq!(app.orientation(), Color::Black);
        assert!(app.board().piece_at(sq("e1")).is_some());
        assert_eq!(app.cursor(), sq("e7"));
        assert_eq!(app.eval().user_percent(), 50);
    }

    #[test]
    fn pick_up_requires_an_own_piece_on_turn() {
        let mut app = App::new();
        app.handle_event(SessionEvent::Ready(ready_update(Color::White)));

        // Empty square: nothing picked.
        app.cursor = sq("e4");
        assert_eq!(app.handle_key(KeyCode::Enter), None);
        assert_eq!(app.picked(), None);

        // Opponent piece: nothing picked.
        app.cursor = sq("e7");
        assert_eq!(app.handle_key(KeyCode::Enter), None);
        assert_eq!(app.picked(), None);

        // Own piece: picked up.
        app.cursor = sq("e2");
        assert_eq!(app.handle_key(KeyCode::Enter), None);
        assert_eq!(app.picked(), Some(sq("e2")));
    }

    #[test]
    fn pick_up_is_blocked_during_the_opponent_turn() {
        let mut app = App::new();
        // Playing black, white to move: opponent's turn.
        app.handle_event(SessionEvent::Ready(ready_update(Color::Black)));
        app.cursor = sq("e7");
        assert_eq!(app.handle_key(KeyCode::Enter), None);
        assert_eq!(app.picked(), None);
        assert_eq!(app.status(), "Not your turn.");
    }

    #[test]
    fn drop_on_a_legal_square_submits() {
        let mut app = App::new();
        app.handle_event(SessionEvent::Ready(ready_update(Color::White)));
        app.cursor = sq("e2");
        app.handle_key(KeyCode::Enter);
        app.cursor = sq("e4");
        assert_eq!(
            app.handle_key(KeyCode::Enter),
            Some(AppCommand::Submit(sq("e2"), sq("e4")))
        );
        assert_eq!(app.picked(), None);
    }

    #[test]
    fn drop_on_an_illegal_square_snaps_back() {
        let mut app = App::new();
        app.handle_event(SessionEvent::Ready(ready_update(Color::White)));
        app.cursor = sq("e2");
        app.handle_key(KeyCode::Enter);
        app.cursor = sq("e5");
        assert_eq!(app.handle_key(KeyCode::Enter), None);
        assert_eq!(app.picked(), None);
    }

    #[test]
    fn dropping_back_on_the_pick_square_cancels() {
        let mut app = App::new();
        app.handle_event(SessionEvent::Ready(ready_update(Color::White)));
        app.cursor = sq("e2");
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.handle_key(KeyCode::Enter), None);
        assert_eq!(app.picked(), None);
    }

    #[test]
    fn hints_follow_the_hovered_square() {
        let mut app = App::new();
        app.handle_event(SessionEvent::Ready(ready_update(Color::White)));
        app.cursor = sq("e2");
        assert_eq!(app.hints().len(), 2);
        app.cursor = sq("a8");
        assert!(app.hints().is_empty());
    }

    #[test]
    fn new_game_is_offered_only_after_close() {
        let mut app = App::new();
        app.handle_event(SessionEvent::Ready(ready_update(Color::White)));
        assert_eq!(app.handle_key(KeyCode::Char('n')), None);

        app.handle_event(SessionEvent::Closed);
        assert_eq!(app.handle_key(KeyCode::Char('n')), Some(AppCommand::NewGame));
        assert_eq!(app.handle_key(KeyCode::Char('q')), Some(AppCommand::Quit));
    }

    #[test]
    fn alerts_stick_until_a_new_game() {
        let mut app = App::new();
        app.handle_event(SessionEvent::Alert("rules engine unreachable".to_string()));
        app.handle_event(SessionEvent::Closed);
        assert_eq!(app.alert(), Some("rules engine unreachable"));
        assert!(app.status().contains("'n'"));
    }
}
