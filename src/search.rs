use crate::board::Board;
use crate::evaluator::evaluate_material;
use crate::types::{Score, INFINITY, MATE_SCORE};
use crate::visitor::SearchVisitor;

/// Negamax alpha-beta search. Called once per search at a fixed depth: no
/// transposition table, quiescence extension, or iterative-deepening driver
/// wraps this function.
pub fn alphabeta<V: SearchVisitor>(board: &mut Board, depth: u32, alpha: Score, beta: Score, visitor: &mut V) -> Score {
    visitor.start();
    let result = alphabeta_inner(board, depth, alpha, beta, visitor);
    visitor.end();
    result
}

fn alphabeta_inner<V: SearchVisitor>(board: &mut Board, depth: u32, mut alpha: Score, beta: Score, visitor: &mut V) -> Score {
    if depth == 0 {
        return evaluate_material(board);
    }

    let mut mate_flag = true;

    for mv in crate::board::legal_move_gen(board) {
        if visitor.skip(mv) {
            continue;
        }
        visitor.current_move(mv);
        mate_flag = false;

        let mut child = visitor.child();
        let score = {
            let mut guarded = board.do_move(mv);
            -alphabeta(&mut guarded, depth - 1, -beta, -alpha, &mut child)
        };

        if score >= beta && score != INFINITY {
            visitor.new_best_move(&child, score, false);
            return beta;
        }
        if score > alpha {
            alpha = score;
            visitor.new_best_move(&child, score, true);
        }
        if visitor.halt() {
            return score;
        }
    }

    if mate_flag {
        if crate::board::in_check(board) {
            visitor.mated();
            return -MATE_SCORE;
        }
        visitor.stalemated();
        return 0;
    }

    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ChessMove;
    use crate::visitor::PvVisitor;

    fn best_move(fen: &str, depth: u32) -> (Score, Option<ChessMove>) {
        let mut board = Board::from_fen(fen).unwrap();
        let mut visitor = PvVisitor::default();
        let score = alphabeta(&mut board, depth, -INFINITY, INFINITY, &mut visitor);
        (score, visitor.best_move)
    }

    #[test]
    fn test_mate_in_one() {
        let (score, best) = best_move("7k/8/8/8/3r4/8/2r5/K7 b - - 0 1", 2);
        assert_eq!(score, MATE_SCORE);
        assert_eq!(best, Some(ChessMove::from_text("d4d1").unwrap()));
    }

    #[test]
    fn test_mate_in_two() {
        let mut board = Board::from_fen("7k/4Q3/8/6K1/8/8/8/8 w - - 0 1").unwrap();
        let mut visitor = PvVisitor::default();
        let score = alphabeta(&mut board, 4, -INFINITY, INFINITY, &mut visitor);
        assert_eq!(score, MATE_SCORE);
        assert!(visitor.pv.len() <= 4);
        let first = visitor.pv[0].to_text();
        assert!(["g5f6", "g5g6", "g5h6"].contains(&first.as_str()));
    }

    #[test]
    fn test_alphabeta_matches_naive_negamax() {
        fn naive_negamax(board: &mut Board, depth: u32) -> Score {
            if depth == 0 {
                return evaluate_material(board);
            }
            let moves = crate::board::legal_move_gen(board);
            if moves.is_empty() {
                return if crate::board::in_check(board) { -MATE_SCORE } else { 0 };
            }
            let mut best = -INFINITY;
            for mv in moves {
                let mut guarded = board.do_move(mv);
                let score = -naive_negamax(&mut guarded, depth - 1);
                drop(guarded);
                best = best.max(score);
            }
            best
        }

        let positions = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        ];
        for fen in positions {
            let mut a = Board::from_fen(fen).unwrap();
            let mut b = Board::from_fen(fen).unwrap();
            let mut visitor = PvVisitor::default();
            let ab_score = alphabeta(&mut a, 3, -INFINITY, INFINITY, &mut visitor);
            let naive_score = naive_negamax(&mut b, 3);
            assert_eq!(ab_score, naive_score, "mismatch for {fen}");
        }
    }

    #[test]
    fn test_stalemate_scores_zero() {
        let (score, _) = best_move("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 1);
        assert_eq!(score, 0);
    }
}

// Fail-hard alpha-beta: a cutoff returns `beta` exactly rather than the raw score,
// keeping bounds tight. The `score != INFINITY` guard on the cutoff branch stops a
// synthetic +INFINITY from a deeper mate-less subtree from poisoning this node's bound.
