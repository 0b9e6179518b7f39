mod attacks;
mod bitboard;
#[allow(clippy::module_inception)]
mod board;
mod chessmove;
mod movegen;
mod piece;
mod square;

pub use attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
pub use bitboard::{BitBoard, EMPTY};
pub use board::{Board, BoardStatus, Undo, BK, BQ, WK, WQ};
pub use chessmove::ChessMove;
pub use movegen::{attackers, in_check, is_attacked, legal_move_gen, pseudo_legal_moves, MoveList};
pub use piece::{Color, Piece};
pub use square::{File, Rank, Square, ALL_SQUARES};
