//! Per-square ray masks and square-pair geometry.
//!
//! `RAYS[dir][sq]` holds every square reached from `sq` in one direction on an
//! empty board. Directions 0..4 increase the square index (the nearest blocker
//! is the least significant bit), directions 4..8 decrease it (nearest blocker
//! is the most significant bit).

use crate::game_state::chess_types::Square;

pub const NORTH: usize = 0;
pub const NORTH_EAST: usize = 1;
pub const EAST: usize = 2;
pub const NORTH_WEST: usize = 3;
pub const SOUTH: usize = 4;
pub const SOUTH_WEST: usize = 5;
pub const WEST: usize = 6;
pub const SOUTH_EAST: usize = 7;

/// `(file_step, rank_step)` for each direction index.
pub const DIRECTION_STEPS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (-1, 1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (1, -1),
];

pub const ORTHOGONAL_DIRECTIONS: [usize; 4] = [NORTH, EAST, SOUTH, WEST];
pub const DIAGONAL_DIRECTIONS: [usize; 4] = [NORTH_EAST, NORTH_WEST, SOUTH_WEST, SOUTH_EAST];

pub static RAYS: [[u64; 64]; 8] = generate_rays();
pub static LINE_RAYS: [u64; 64] = combine_rays(&ORTHOGONAL_DIRECTIONS);
pub static DIAGONAL_RAYS: [u64; 64] = combine_rays(&DIAGONAL_DIRECTIONS);

static BETWEEN: [[u64; 64]; 64] = generate_between();
static LINE_THROUGH: [[u64; 64]; 64] = generate_line_through();

#[inline]
pub const fn is_positive_direction(direction: usize) -> bool {
    direction < 4
}

/// Squares strictly between two aligned squares (empty when not aligned).
#[inline]
pub fn between(a: Square, b: Square) -> u64 {
    BETWEEN[a as usize][b as usize]
}

/// Full board line through two aligned squares, both endpoints included.
#[inline]
pub fn line_through(a: Square, b: Square) -> u64 {
    LINE_THROUGH[a as usize][b as usize]
}

/// Nearest occupied square along `direction` from `square`, if any.
#[inline]
pub fn first_blocker(direction: usize, square: Square, occupancy: u64) -> Option<Square> {
    let blockers = RAYS[direction][square as usize] & occupancy;
    if blockers == 0 {
        return None;
    }
    Some(if is_positive_direction(direction) {
        blockers.trailing_zeros() as Square
    } else {
        63 - blockers.leading_zeros() as Square
    })
}

/// Ray-traced slider attacks for the given directions. Used to build and
/// verify the magic tables; search code uses the magic lookups instead.
pub fn sliding_attacks_reference(directions: &[usize], square: Square, occupancy: u64) -> u64 {
    let mut attacks = 0u64;
    for &direction in directions {
        let mut ray = RAYS[direction][square as usize];
        if let Some(blocker) = first_blocker(direction, square, occupancy) {
            ray ^= RAYS[direction][blocker as usize];
        }
        attacks |= ray;
    }
    attacks
}

const fn trace_ray_const(square: i32, file_step: i32, rank_step: i32) -> u64 {
    let mut file = (square % 8) + file_step;
    let mut rank = (square / 8) + rank_step;
    let mut attacks = 0u64;

    while file >= 0 && file < 8 && rank >= 0 && rank < 8 {
        attacks |= 1u64 << (rank * 8 + file);
        file += file_step;
        rank += rank_step;
    }

    attacks
}

const fn generate_rays() -> [[u64; 64]; 8] {
    let mut table = [[0u64; 64]; 8];
    let mut dir = 0usize;

    while dir < 8 {
        let mut sq = 0usize;
        while sq < 64 {
            let (file_step, rank_step) = DIRECTION_STEPS[dir];
            table[dir][sq] = trace_ray_const(sq as i32, file_step, rank_step);
            sq += 1;
        }
        dir += 1;
    }

    table
}

const fn combine_rays(directions: &[usize; 4]) -> [u64; 64] {
    let rays = generate_rays();
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let mut i = 0usize;
        while i < 4 {
            table[sq] |= rays[directions[i]][sq];
            i += 1;
        }
        sq += 1;
    }

    table
}

const fn generate_between() -> [[u64; 64]; 64] {
    let mut table = [[0u64; 64]; 64];
    let mut from = 0usize;

    while from < 64 {
        let mut dir = 0usize;
        while dir < 8 {
            let (file_step, rank_step) = DIRECTION_STEPS[dir];
            let mut file = (from % 8) as i32 + file_step;
            let mut rank = (from / 8) as i32 + rank_step;
            let mut passed = 0u64;

            while file >= 0 && file < 8 && rank >= 0 && rank < 8 {
                let to = (rank * 8 + file) as usize;
                table[from][to] = passed;
                passed |= 1u64 << to;
                file += file_step;
                rank += rank_step;
            }
            dir += 1;
        }
        from += 1;
    }

    table
}

const fn generate_line_through() -> [[u64; 64]; 64] {
    let rays = generate_rays();
    let mut table = [[0u64; 64]; 64];
    let mut from = 0usize;

    while from < 64 {
        let mut dir = 0usize;
        while dir < 4 {
            let opposite = dir + 4;
            let line = rays[dir][from] | rays[opposite][from] | (1u64 << from);
            let mut targets = rays[dir][from] | rays[opposite][from];
            while targets != 0 {
                let to = targets.trailing_zeros() as usize;
                table[from][to] = line;
                targets &= targets - 1;
            }
            dir += 1;
        }
        from += 1;
    }

    table
}
