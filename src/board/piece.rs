use std::ops::Not;

use crate::error::ChessError;

/// Chess piece kind (pawn, bishop, knight, rook, queen, king).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Piece {
    Pawn,
    Bishop,
    Knight,
    Rook,
    Queen,
    King,
}

impl Piece {
    #[inline]
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// all 6 piece kinds, in the order this crate's tables index them by
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Bishop,
        Piece::Knight,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// parse a lowercase piece letter (p, b, n, r, q, k)
    pub fn from_char(ch: char) -> Result<Piece, ChessError> {
        match ch {
            'p' => Ok(Piece::Pawn),
            'b' => Ok(Piece::Bishop),
            'n' => Ok(Piece::Knight),
            'r' => Ok(Piece::Rook),
            'q' => Ok(Piece::Queen),
            'k' => Ok(Piece::King),
            other => Err(ChessError::MalformedInput(format!("unknown piece letter '{other}'"))),
        }
    }

    /// piece letter, uppercase for White, lowercase for Black
    pub fn to_char(self, color: Color) -> char {
        let ch = match self {
            Piece::Pawn => 'p',
            Piece::Bishop => 'b',
            Piece::Knight => 'n',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        if color == Color::White { ch.to_ascii_uppercase() } else { ch }
    }

    /// only the four kinds a pawn may promote to, in UCI text order
    pub const PROMOTION_KINDS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];
}

/// color: white or black
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub fn to_index(self) -> usize {
        self as usize
    }
}

impl Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}


// `Piece` and `Color` are single-byte `Copy` types, same as `Square`/`ChessMove`/`BitBoard`:
// nothing here is expensive enough to need borrowing.
