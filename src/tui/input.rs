//! Cursor movement for keyboard navigation.

use crate::board::{Color, Square};
use crossterm::event::KeyCode;

/// Moves the cursor one square for an arrow (or hjkl) key.
///
/// Arrows track the screen, not the coordinates: with black at the bottom
/// the board is drawn flipped, so both axes invert. Moves off the edge
/// leave the cursor where it is.
pub fn move_cursor(cursor: Square, key: KeyCode, orientation: Color) -> Square {
    let (df, dr): (i8, i8) = match key {
        KeyCode::Left | KeyCode::Char('h') => (-1, 0),
        KeyCode::Right | KeyCode::Char('l') => (1, 0),
        KeyCode::Up | KeyCode::Char('k') => (0, 1),
        KeyCode::Down | KeyCode::Char('j') => (0, -1),
        _ => return cursor,
    };
    let (df, dr) = match orientation {
        Color::White => (df, dr),
        Color::Black => (-df, -dr),
    };

    let file = cursor.file() as i8 + df;
    let rank = cursor.rank() as i8 + dr;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Square::new(file as u8, rank as u8).unwrap_or(cursor)
    } else {
        cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn arrows_track_the_screen_for_white() {
        assert_eq!(move_cursor(sq("e4"), KeyCode::Up, Color::White), sq("e5"));
        assert_eq!(move_cursor(sq("e4"), KeyCode::Down, Color::White), sq("e3"));
        assert_eq!(move_cursor(sq("e4"), KeyCode::Left, Color::White), sq("d4"));
        assert_eq!(move_cursor(sq("e4"), KeyCode::Right, Color::White), sq("f4"));
    }

    #[test]
    fn arrows_invert_for_black() {
        assert_eq!(move_cursor(sq("e4"), KeyCode::Up, Color::Black), sq("e3"));
        assert_eq!(move_cursor(sq("e4"), KeyCode::Down, Color::Black), sq("e5"));
        assert_eq!(move_cursor(sq("e4"), KeyCode::Left, Color::Black), sq("f4"));
        assert_eq!(move_cursor(sq("e4"), KeyCode::Right, Color::Black), sq("d4"));
    }

    #[test]
    fn vim_keys_mirror_the_arrows() {
        assert_eq!(
            move_cursor(sq("e4"), KeyCode::Char('k'), Color::White),
            sq("e5")
        );
        assert_eq!(
            move_cursor(sq("e4"), KeyCode::Char('h'), Color::White),
            sq("d4")
        );
    }

    #[test]
    fn edges_stop_the_cursor() {
        assert_eq!(move_cursor(sq("a1"), KeyCode::Left, Color::White), sq("a1"));
        assert_eq!(move_cursor(sq("a1"), KeyCode::Down, Color::White), sq("a1"));
        assert_eq!(move_cursor(sq("h8"), KeyCode::Right, Color::White), sq("h8"));
        assert_eq!(move_cursor(sq("h8"), KeyCode::Up, Color::White), sq("h8"));
        assert_eq!(move_cursor(sq("a1"), KeyCode::Right, Color::Black), sq("a1"));
    }

    #[test]
    fn other_keys_leave_the_cursor_alone() {
        assert_eq!(
            move_cursor(sq("e4"), KeyCode::Char('x'), Color::White),
            sq("e4")
        );
        assert_eq!(move_cursor(sq("e4"), KeyCode::Tab, Color::White), sq("e4"));
    }
}
