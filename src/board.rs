//! Board-widget-side data model.
//!
//! The orchestration layer treats positions as opaque strings; everything
//! that actually looks at squares and pieces lives here, on the widget side
//! of the boundary: coordinates, piece glyphs, the display-only piece
//! layout parsed from a position string, and the instruction list the
//! session hands the widget instead of driving it directly.

use derive_more::{Display, Error};
use std::fmt;
use std::str::FromStr;

/// Side color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    /// The side that moves first from the standard position.
    White,
    /// The other side.
    Black,
}

impl Color {
    /// Returns the opposing color.
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// A board square in algebraic coordinates (`a1`..`h8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Creates a square from zero-based file (`a` = 0) and rank
    /// (rank `1` = 0) indices. `None` if either index is off the board.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// Zero-based file index, `a` = 0.
    pub fn file(self) -> u8 {
        self.file
    }

    /// Zero-based rank index, rank `1` = 0.
    pub fn rank(self) -> u8 {
        self.rank
    }

    /// True on rank 1 or rank 8, the ranks where pawns promote.
    pub fn is_back_rank(self) -> bool {
        self.rank == 0 || self.rank == 7
    }
}

impl Default for Square {
    /// `a1`.
    fn default() -> Self {
        Self { file: 0, rank: 0 }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, (b'1' + self.rank) as char)
    }
}

/// Error parsing a square from text.
#[derive(Debug, Clone, Display, Error)]
#[display("`{text}` is not a board square")]
pub struct SquareParseError {
    text: String,
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SquareParseError { text: s.to_string() };
        let &[file, rank] = s.as_bytes() else {
            return Err(err());
        };
        Square::new(file.wrapping_sub(b'a'), rank.wrapping_sub(b'1')).ok_or_else(err)
    }
}

/// Kind of chess piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// Pawn.
    Pawn,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Rook.
    Rook,
    /// Queen.
    Queen,
    /// King.
    King,
}

impl PieceKind {
    /// Parses a FEN piece letter, either case.
    pub fn from_fen_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Filled chess glyph; the terminal renderer colors it per side.
    pub fn glyph(self) -> char {
        match self {
            PieceKind::Pawn => '♟',
            PieceKind::Knight => '♞',
            PieceKind::Bishop => '♝',
            PieceKind::Rook => '♜',
            PieceKind::Queen => '♛',
            PieceKind::King => '♚',
        }
    }
}

/// A piece: kind plus owning side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// Piece kind.
    pub kind: PieceKind,
    /// Owning side.
    pub color: Color,
}

/// Error reading the piece placement of a position string.
#[derive(Debug, Clone, Display, Error)]
pub enum BoardError {
    /// The position string is empty.
    #[display("position string has no piece placement field")]
    MissingPlacement,
    /// The placement field does not describe exactly 8 ranks.
    #[display("piece placement does not describe 8 ranks")]
    BadRankCount,
    /// A rank describes more than 8 files.
    #[display("rank `{rank}` overflows 8 files")]
    RankOverflow {
        /// The offending rank, as written.
        rank: String,
    },
    /// A letter in the placement is not a piece.
    #[display("unknown piece letter `{letter}`")]
    UnknownPiece {
        /// The offending letter.
        letter: char,
    },
}

/// Display-only piece layout parsed from a position string.
///
/// This is the widget's view of the position, refreshed from the same
/// string the widget renders. The session consults it for exactly two
/// queries, which piece sits on a square (promotion detection) and where
/// a king stands (check highlighting); legality always comes from the
/// rules engine.
#[derive(Debug, Clone, Default)]
pub struct DisplayBoard {
    squares: [[Option<Piece>; 8]; 8],
}

impl DisplayBoard {
    /// Parses the piece placement (first field) of a FEN position string.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let placement = fen
            .split_whitespace()
            .next()
            .ok_or(BoardError::MissingPlacement)?;

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(BoardError::BadRankCount);
        }

        let mut squares = [[None; 8]; 8];
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if file > 7 {
                    return Err(BoardError::RankOverflow {
                        rank: rank_str.to_string(),
                    });
                }
                let kind = PieceKind::from_fen_char(c)
                    .ok_or(BoardError::UnknownPiece { letter: c })?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                squares[rank][file] = Some(Piece { kind, color });
                file += 1;
            }
        }

        Ok(Self { squares })
    }

    /// Piece on the given square, if any.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.rank() as usize][square.file() as usize]
    }

    /// Locates the king of the given color.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        for rank in 0..8 {
            for file in 0..8 {
                let square = Square { file, rank };
                let hit = self.piece_at(square)
                    == Some(Piece {
                        kind: PieceKind::King,
                        color,
                    });
                if hit {
                    return Some(square);
                }
            }
        }
        None
    }
}

/// One visual instruction for the board widget.
///
/// The session emits these instead of touching the widget, so the state
/// machine stays testable without any rendering in sight. The adapter
/// applies them in order.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEffect {
    /// Replace the rendered position, with `orientation`'s side at the
    /// bottom of the board.
    Render {
        /// Position string to render, verbatim from the engine.
        position: String,
        /// Side shown at the bottom.
        orientation: Color,
    },
    /// Remove last-move and check highlights.
    ClearHighlights,
    /// Highlight the two squares of the move just played.
    HighlightLastMove {
        /// Source square.
        from: Square,
        /// Destination square.
        to: Square,
    },
    /// Highlight the checked king.
    HighlightCheck {
        /// The checked king's square.
        king: Square,
    },
    /// Announce the end of the game.
    Announce(Verdict),
}

/// Terminal game result, as far as the front end can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The side to move has no moves and is in check.
    Checkmate {
        /// The winning side.
        winner: Color,
    },
    /// The side to move has no moves but is not in check.
    Stalemate,
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn squares_round_trip_through_text() {
        for name in ["a1", "e4", "h8", "c7"] {
            assert_eq!(sq(name).to_string(), name);
        }
    }

    #[test]
    fn rejects_off_board_squares() {
        for bad in ["", "e", "e9", "i4", "e44", "4e"] {
            assert!(bad.parse::<Square>().is_err(), "{bad} parsed");
        }
    }

    #[test]
    fn back_ranks_are_first_and_last() {
        assert!(sq("e1").is_back_rank());
        assert!(sq("a8").is_back_rank());
        assert!(!sq("e4").is_back_rank());
        assert!(!sq("h7").is_back_rank());
    }

    #[test]
    fn parses_starting_position() {
        let board = DisplayBoard::from_fen(START).unwrap();
        assert_eq!(
            board.piece_at(sq("a1")),
            Some(Piece {
                kind: PieceKind::Rook,
                color: Color::White
            })
        );
        assert_eq!(
            board.piece_at(sq("e8")),
            Some(Piece {
                kind: PieceKind::King,
                color: Color::Black
            })
        );
        assert_eq!(
            board.piece_at(sq("d2")),
            Some(Piece {
                kind: PieceKind::Pawn,
                color: Color::White
            })
        );
        assert_eq!(board.piece_at(sq("e4")), None);
    }

    #[test]
    fn parses_an_empty_board() {
        let board = DisplayBoard::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        for rank in 0..8 {
            for file in 0..8 {
                assert_eq!(board.piece_at(Square::new(file, rank).unwrap()), None);
            }
        }
    }

    #[test]
    fn rejects_bad_placements() {
        assert!(matches!(
            DisplayBoard::from_fen(""),
            Err(BoardError::MissingPlacement)
        ));
        assert!(matches!(
            DisplayBoard::from_fen("8/8/8 w - - 0 1"),
            Err(BoardError::BadRankCount)
        ));
        assert!(matches!(
            DisplayBoard::from_fen("xnbqkbnr/8/8/8/8/8/8/8 w - - 0 1"),
            Err(BoardError::UnknownPiece { letter: 'x' })
        ));
        assert!(matches!(
            DisplayBoard::from_fen("rnbqkbnrr/8/8/8/8/8/8/8 w - - 0 1"),
            Err(BoardError::RankOverflow { .. })
        ));
    }

    #[test]
    fn finds_both_kings() {
        let board = DisplayBoard::from_fen(START).unwrap();
        assert_eq!(board.king_square(Color::White), Some(sq("e1")));
        assert_eq!(board.king_square(Color::Black), Some(sq("e8")));
        let empty = DisplayBoard::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(empty.king_square(Color::White), None);
    }
}
