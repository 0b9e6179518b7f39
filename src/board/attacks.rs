use std::sync::OnceLock;

use super::bitboard::BitBoard;
use super::piece::Color;
use super::square::Square;

/// Precomputed leaper attack tables (knight, king, pawn). These don't depend on
/// occupancy, so they're built once on first use and read thereafter.
struct LeaperTables {
    knight: [BitBoard; 64],
    king: [BitBoard; 64],
    pawn: [[BitBoard; 64]; 2],
}

static LEAPER_TABLES: OnceLock<LeaperTables> = OnceLock::new();

fn leaper_tables() -> &'static LeaperTables {
    LEAPER_TABLES.get_or_init(|| LeaperTables {
        knight: build_offset_table(&[(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)]),
        king: build_offset_table(&[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)]),
        pawn: [build_pawn_table(Color::White), build_pawn_table(Color::Black)],
    })
}

fn build_offset_table(offsets: &[(i8, i8)]) -> [BitBoard; 64] {
    let mut table = [BitBoard(0); 64];
    for sq in 0..64u8 {
        let r = (sq >> 3) as i8;
        let f = (sq & 7) as i8;
        let mut bb = 0u64;
        for &(dr, df) in offsets {
            let nr = r + dr;
            let nf = f + df;
            if (0..8).contains(&nr) && (0..8).contains(&nf) {
                bb |= 1u64 << (nr * 8 + nf);
            }
        }
        table[sq as usize] = BitBoard(bb);
    }
    table
}

fn build_pawn_table(color: Color) -> [BitBoard; 64] {
    let dr: i8 = if color == Color::White { 1 } else { -1 };
    let mut table = [BitBoard(0); 64];
    for sq in 0..64u8 {
        let r = (sq >> 3) as i8;
        let f = (sq & 7) as i8;
        let nr = r + dr;
        if !(0..8).contains(&nr) {
            continue;
        }
        let mut bb = 0u64;
        if f > 0 {
            bb |= 1u64 << (nr * 8 + (f - 1));
        }
        if f + 1 < 8 {
            bb |= 1u64 << (nr * 8 + (f + 1));
        }
        table[sq as usize] = BitBoard(bb);
    }
    table
}

#[inline]
pub fn knight_attacks(sq: Square) -> BitBoard {
    leaper_tables().knight[sq.to_index()]
}

#[inline]
pub fn king_attacks(sq: Square) -> BitBoard {
    leaper_tables().king[sq.to_index()]
}

#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> BitBoard {
    leaper_tables().pawn[color.to_index()][sq.to_index()]
}

/// directions used by the rook/bishop ray casts
const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Slide outward from `sq` along each direction up to seven steps, stopping at
/// (and including) the first occupied square. No precomputed table: at this
/// engine's scale a direct ray cast is simpler than a magic-bitboard index and
/// fast enough, since nothing here drives a search deep enough to be
/// occupancy-lookup bound.
fn ray_attacks(sq: Square, occupied: BitBoard, dirs: &[(i8, i8); 4]) -> BitBoard {
    let mut attacks = 0u64;
    let r = (sq.to_index() / 8) as i8;
    let f = (sq.to_index() % 8) as i8;
    for &(dr, df) in dirs {
        let mut nr = r + dr;
        let mut nf = f + df;
        while (0..8).contains(&nr) && (0..8).contains(&nf) {
            let bit = 1u64 << (nr * 8 + nf);
            attacks |= bit;
            if occupied.0 & bit != 0 {
                break;
            }
            nr += dr;
            nf += df;
        }
    }
    BitBoard(attacks)
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    ray_attacks(sq, occupied, &ROOK_DIRS)
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    ray_attacks(sq, occupied, &BISHOP_DIRS)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::square::{File, Rank};

    fn sq(r: usize, f: usize) -> Square {
        Square::make_square(Rank::from_index(r), File::from_index(f))
    }

    #[test]
    fn test_knight_attacks_corner() {
        let attacks = knight_attacks(sq(0, 0)); // A1
        assert_eq!(attacks.popcnt(), 2); // B3, C2
    }

    #[test]
    fn test_knight_attacks_center() {
        let attacks = knight_attacks(sq(3, 3)); // D4
        assert_eq!(attacks.popcnt(), 8);
    }

    #[test]
    fn test_king_attacks_corner() {
        let attacks = king_attacks(sq(0, 0)); // A1
        assert_eq!(attacks.popcnt(), 3);
    }

    #[test]
    fn test_king_attacks_center() {
        let attacks = king_attacks(sq(3, 3)); // D4
        assert_eq!(attacks.popcnt(), 8);
    }

    #[test]
    fn test_pawn_attacks_white() {
        let attacks = pawn_attacks(Color::White, sq(1, 4)); // E2
        assert_eq!(attacks.popcnt(), 2); // D3, F3
    }

    #[test]
    fn test_pawn_attacks_edge() {
        let attacks = pawn_attacks(Color::White, sq(1, 0)); // A2
        assert_eq!(attacks.popcnt(), 1); // B3 only
    }

    #[test]
    fn test_rook_attacks_empty_board() {
        let attacks = rook_attacks(sq(3, 3), BitBoard(0)); // D4 on empty board
        assert_eq!(attacks.popcnt(), 14); // full rank + file minus self
    }

    #[test]
    fn test_bishop_attacks_empty_board() {
        let attacks = bishop_attacks(sq(3, 3), BitBoard(0)); // D4 on empty board
        assert_eq!(attacks.popcnt(), 13);
    }

    #[test]
    fn test_queen_equals_bishop_or_rook() {
        let occ = BitBoard(0x0000_0010_0800_0000); // some blockers
        let s = sq(4, 4); // E5
        let q = queen_attacks(s, occ);
        let b = bishop_attacks(s, occ);
        let r = rook_attacks(s, occ);
        assert_eq!(q, b | r);
    }

    #[test]
    fn test_rook_attacks_with_blockers() {
        // Rook on A1, blocker on A4 and D1
        let blocker = BitBoard::from_square(sq(3, 0)) | BitBoard::from_square(sq(0, 3));
        let attacks = rook_attacks(sq(0, 0), blocker);
        // Should reach A2, A3, A4 (blocked), B1, C1, D1 (blocked) = 6 squares
        assert_eq!(attacks.popcnt(), 6);
    }

    #[test]
    fn test_bishop_attacks_with_blockers() {
        // Bishop on D4, blocker on F6
        let blocker = BitBoard::from_square(sq(5, 5)); // F6
        let attacks = bishop_attacks(sq(3, 3), blocker);
        // NE: E5, F6 (blocked) = 2; NW: C5, B6, A7 = 3; SE: E3, F2, G1 = 3; SW: C3, B2, A1 = 3
        assert_eq!(attacks.popcnt(), 11);
    }

    #[test]
    fn test_rook_attacks_all_squares_empty_board() {
        for r in 0..8 {
            for f in 0..8 {
                let attacks = rook_attacks(sq(r, f), BitBoard(0));
                assert_eq!(
                    attacks.popcnt(),
                    14,
                    "Rook on ({},{}) should have 14 attacks on empty board, got {}",
                    r,
                    f,
                    attacks.popcnt()
                );
            }
        }
    }
}

// Knight/king/pawn attack sets don't depend on occupancy, so they're precomputed once into
// `OnceLock`-guarded tables on first use rather than recomputed per lookup.
//
// Slider (bishop/rook/queen) attacks do depend on occupancy and are computed fresh each call by
// casting a ray in each direction until a blocker (inclusive) or the edge of the board is hit.
