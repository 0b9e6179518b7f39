use std::fmt;

use super::piece::Piece;
use super::square::Square;
use crate::error::ChessError;

/// Chess move encoded compactly in a u16.
///
/// Layout: `src(6) | dst(6) | promo(2) | is_promo(1) | reserved(1)`
///   - bits 0..5:  source square (0-63)
///   - bits 6..11: destination square (0-63)
///   - bits 12..13: promotion piece (0=Knight, 1=Bishop, 2=Rook, 3=Queen)
///   - bit 14: is_promotion flag
///   - bit 15: reserved
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove(u16);

impl ChessMove {
    #[inline]
    pub fn new(src: Square, dst: Square, promotion: Option<Piece>) -> Self {
        let mut bits = (src.to_index() as u16) | ((dst.to_index() as u16) << 6);
        if let Some(p) = promotion {
            let code = match p {
                Piece::Knight => 0,
                Piece::Bishop => 1,
                Piece::Rook => 2,
                Piece::Queen => 3,
                _ => 3, // default to queen for invalid promo pieces
            };
            bits |= code << 12;
            bits |= 1 << 14; // is_promotion flag
        }
        ChessMove(bits)
    }

    #[inline]
    pub fn get_source(self) -> Square {
        Square::new((self.0 & 0x3F) as u8)
    }

    #[inline]
    pub fn get_dest(self) -> Square {
        Square::new(((self.0 >> 6) & 0x3F) as u8)
    }

    #[inline]
    pub fn get_promotion(self) -> Option<Piece> {
        if self.0 & (1 << 14) == 0 {
            None
        } else {
            Some(match (self.0 >> 12) & 3 {
                0 => Piece::Knight,
                1 => Piece::Bishop,
                2 => Piece::Rook,
                _ => Piece::Queen,
            })
        }
    }

    /// parse a move from its UCI textual form: `<src><dst>[<promo-char>]`,
    /// e.g. "e2e4" or "a7a8q". Rejects whitespace inside the token.
    pub fn from_text(text: &str) -> Result<ChessMove, ChessError> {
        if text.len() < 4 || text.len() > 5 || text.chars().any(char::is_whitespace) {
            return Err(ChessError::MalformedInput(format!("move '{text}' is malformed")));
        }
        let src = Square::from_text(&text[0..2])?;
        let dst = Square::from_text(&text[2..4])?;
        let promotion = match text.get(4..5) {
            None => None,
            Some(c) => Some(Piece::from_char(c.chars().next().unwrap())?),
        };
        Ok(ChessMove::new(src, dst, promotion))
    }

    /// the UCI textual form of this move, e.g. "e2e4" or "a7a8q"
    pub fn to_text(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.get_source(), self.get_dest())?;
        if let Some(promo) = self.get_promotion() {
            let c = match promo {
                Piece::Knight => 'n',
                Piece::Bishop => 'b',
                Piece::Rook => 'r',
                Piece::Queen => 'q',
                _ => 'q',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChessMove({})", self)
    }
}


// move is packed into 16 bit int for maximum cache efficiency
// so w/ encoding, move lists fit in cache lines and comparisons are single integer comparisons
