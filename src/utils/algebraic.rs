//! Square and bitboard conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and internal
//! square/bitboard representations reused by FEN and move notation.

use crate::errors::NotationError;
use crate::game_state::chess_types::Square;

/// Convert algebraic notation (for example: "e4") to a square index.
#[inline]
pub fn algebraic_to_square(square: &str) -> Result<Square, NotationError> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(NotationError::InvalidSquare(square.to_owned()));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(NotationError::InvalidSquare(square.to_owned()));
    }

    Ok((rank - b'1') * 8 + (file - b'a'))
}

/// Convert a square index (`0..=63`) to algebraic notation (for example: "e4").
#[inline]
pub fn square_to_algebraic(square: Square) -> Result<String, NotationError> {
    if square > 63 {
        return Err(NotationError::SquareOutOfBounds(square));
    }

    let file_char = char::from(b'a' + square % 8);
    let rank_char = char::from(b'1' + square / 8);

    Ok(format!("{file_char}{rank_char}"))
}

/// Algebraic name of an in-range square. Squares decoded from a `Move` are
/// always in range, so this is the infallible form used by notation output.
#[inline]
pub fn square_name(square: Square) -> String {
    let square = square & 63;
    format!(
        "{}{}",
        char::from(b'a' + square % 8),
        char::from(b'1' + square / 8)
    )
}

/// Convert a one-hot bitboard to algebraic notation.
#[inline]
pub fn bitboard_to_algebraic(bitboard: u64) -> Result<String, NotationError> {
    if bitboard.count_ones() != 1 {
        return Err(NotationError::InvalidSquare(format!("{bitboard:#018x}")));
    }

    square_to_algebraic(bitboard.trailing_zeros() as Square)
}
