//! Move-notation translation between the board widget and the rules
//! engine.
//!
//! Both sides describe a move as a source/destination square pair, with
//! one exception: castling. The widget only ever sees the king travel two
//! squares (`e1g1`), while the engine speaks symbolic tokens (`O-O`,
//! `O-O-O`). Each side and castling type has exactly one king square pair,
//! so translation keyed on the pair alone is a bijection over the four
//! castle moves and the identity everywhere else.
//!
//! Both directions are pure and total: any input that is not one of the
//! four mapped moves for the given side passes through untouched, which
//! keeps promotion suffixes (`e7e8q`) and even malformed text intact for
//! the engine to judge.

use crate::board::Color;

/// Kingside castle in engine notation.
pub const KINGSIDE: &str = "O-O";

/// Queenside castle in engine notation.
pub const QUEENSIDE: &str = "O-O-O";

/// Rewrites a visual move into engine notation.
///
/// Only the moving side's own castling square pairs are rewritten; the
/// opposing king's pairs pass through like any other move. A regular move
/// that happens to share a castling square pair is rewritten too, and the
/// engine's legality check is the arbiter for that position.
pub fn to_engine_notation(mv: &str, side_to_move: Color) -> String {
    match (side_to_move, mv) {
        (Color::White, "e1g1") | (Color::Black, "e8g8") => KINGSIDE.to_string(),
        (Color::White, "e1c1") | (Color::Black, "e8c8") => QUEENSIDE.to_string(),
        _ => mv.to_string(),
    }
}

/// Rewrites an engine move into visual notation.
///
/// Inverse of [`to_engine_notation`] over castles, identity elsewhere.
pub fn to_visual_notation(mv: &str, side_to_move: Color) -> String {
    match (side_to_move, mv) {
        (Color::White, KINGSIDE) => "e1g1".to_string(),
        (Color::White, QUEENSIDE) => "e1c1".to_string(),
        (Color::Black, KINGSIDE) => "e8g8".to_string(),
        (Color::Black, QUEENSIDE) => "e8c8".to_string(),
        _ => mv.to_string(),
    }
}
