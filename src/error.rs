use thiserror::Error;

/// Crate-wide error type. Every fallible core operation returns one of these
/// variants rather than a bare `String`, so callers can match on the kind of
/// failure instead of parsing a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// A square, move, or other text token could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A FEN string's shape is wrong (field count, rank record syntax) independent
    /// of whether the position it would describe is legal.
    #[error("malformed fen: {0}")]
    MalformedFen(String),

    /// A FEN parsed but the position it describes violates a board invariant.
    #[error("illegal position: {0}")]
    IllegalPosition(String),

    /// A requested move is not present in `legal_move_gen` for the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// The search worker thread failed; carries a human-readable reason.
    #[error("search failure: {0}")]
    SearchFailure(String),
}

pub type ChessResult<T> = Result<T, ChessError>;
