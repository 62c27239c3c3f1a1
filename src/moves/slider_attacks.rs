//! Bishop, rook and queen attack lookups backed by the magic tables.

use crate::game_state::chess_types::Square;
use crate::moves::magic_tables::magic_tables;

#[inline]
pub fn bishop_attacks(square: Square, occupancy: u64) -> u64 {
    magic_tables().bishop.attacks(square, occupancy)
}

#[inline]
pub fn rook_attacks(square: Square, occupancy: u64) -> u64 {
    magic_tables().rook.attacks(square, occupancy)
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: u64) -> u64 {
    let tables = magic_tables();
    tables.bishop.attacks(square, occupancy) | tables.rook.attacks(square, occupancy)
}
