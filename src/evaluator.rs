use crate::board::{Board, Piece};
use crate::types::Score;

fn piece_value(piece: Piece) -> Score {
    match piece {
        Piece::Pawn => 1,
        Piece::Bishop => 3,
        Piece::Knight => 3,
        Piece::Rook => 5,
        Piece::Queen => 9,
        Piece::King => 0,
    }
}

/// material balance from the side-to-move's perspective: own material minus the
/// opponent's. No positional term (piece-square tables, mobility, king safety,
/// pawn structure) is computed here.
pub fn evaluate_material(board: &Board) -> Score {
    let us = board.side_to_move();
    let them = !us;

    let own: Score = board.iter_pieces(us).map(|(_, p)| piece_value(p)).sum();
    let opp: Score = board.iter_pieces(them).map(|(_, p)| piece_value(p)).sum();

    own - opp
}
