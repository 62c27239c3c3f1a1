//! Error types for the engine's fallible boundaries.
//!
//! Bad input is rejected where it enters the crate (position text, move text,
//! externally requested moves). Once a `GameState` exists the search core
//! assumes it is structurally valid and does not return errors for it.

use thiserror::Error;

use crate::game_state::chess_types::Square;

/// Failure to parse a Forsyth-Edwards Notation record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("missing {0} in FEN")]
    MissingField(&'static str),

    #[error("FEN has extra trailing fields")]
    TrailingFields,

    #[error("board layout must contain 8 ranks, found {0}")]
    RankCount(usize),

    #[error("board rank {rank} does not sum to 8 files")]
    RankWidth { rank: usize },

    #[error("invalid piece character '{0}' in board layout")]
    InvalidPiece(char),

    #[error("invalid side-to-move field: {0}")]
    InvalidSide(String),

    #[error("invalid castling rights character: {0}")]
    InvalidCastling(char),

    #[error("invalid en-passant field: {0}")]
    InvalidEnPassant(String),

    #[error("invalid {field}: {value}")]
    InvalidCounter { field: &'static str, value: String },

    #[error("each side needs exactly one king")]
    KingCount,

    #[error("pawn on a back rank")]
    PawnOnBackRank,

    #[error("side not to move is in check")]
    OpponentInCheck,
}

/// Failure to read or match human move/square notation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("invalid algebraic square: {0}")]
    InvalidSquare(String),

    #[error("square index out of bounds: {0}")]
    SquareOutOfBounds(Square),

    #[error("malformed move text: {0}")]
    MalformedMove(String),

    #[error("no legal move matches {0}")]
    NoMatchingMove(String),

    #[error("move text {0} is ambiguous")]
    AmbiguousMove(String),
}

/// A move offered from outside the generator could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("move {0:#x} is not legal in this position")]
    IllegalMove(u32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("position has no legal moves")]
    NoLegalMoves,
}
