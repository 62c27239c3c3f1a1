//! Knight, king and pawn attack tables.
//!
//! All tables are evaluated at compile time from step lists, so lookups are a
//! single indexed load with no initialization cost.

use crate::game_state::chess_types::{Color, Square};

const KNIGHT_STEPS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const LIGHT_PAWN_CAPTURE_STEPS: [(i32, i32); 2] = [(-1, 1), (1, 1)];
const DARK_PAWN_CAPTURE_STEPS: [(i32, i32); 2] = [(-1, -1), (1, -1)];

pub const KNIGHT_ATTACKS: [u64; 64] = generate_step_table(&KNIGHT_STEPS);
pub const KING_ATTACKS: [u64; 64] = generate_step_table(&KING_STEPS);

/// Squares a pawn of the given color attacks, indexed `[color][square]`.
pub const PAWN_ATTACKS: [[u64; 64]; 2] = [
    generate_step_table(&LIGHT_PAWN_CAPTURE_STEPS),
    generate_step_table(&DARK_PAWN_CAPTURE_STEPS),
];

#[inline]
pub const fn knight_attacks(square: Square) -> u64 {
    KNIGHT_ATTACKS[square as usize]
}

#[inline]
pub const fn king_attacks(square: Square) -> u64 {
    KING_ATTACKS[square as usize]
}

#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> u64 {
    PAWN_ATTACKS[color.index()][square as usize]
}

/// Shift a pawn set one rank forward for `color`.
#[inline]
pub const fn pawn_push_targets(color: Color, pawns: u64) -> u64 {
    match color {
        Color::Light => pawns << 8,
        Color::Dark => pawns >> 8,
    }
}

const fn generate_step_table(steps: &[(i32, i32)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut attacks = 0u64;
        let mut i = 0usize;

        while i < steps.len() {
            attacks |= set_if_valid(file + steps[i].0, rank + steps[i].1);
            i += 1;
        }

        table[sq] = attacks;
        sq += 1;
    }

    table
}

const fn set_if_valid(file: i32, rank: i32) -> u64 {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return 0;
    }

    1u64 << ((rank as usize) * 8 + (file as usize))
}
