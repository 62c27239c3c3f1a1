//! Magic-bitboard slider tables.
//!
//! Multipliers are found at first use by a seeded sparse-random search and
//! every candidate is verified against the ray-traced reference before it is
//! accepted, so the tables are correct by construction and identical between
//! runs.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use crate::game_state::chess_types::Square;
use crate::moves::ray_masks::{
    is_positive_direction, sliding_attacks_reference, DIAGONAL_DIRECTIONS, ORTHOGONAL_DIRECTIONS,
    RAYS,
};

const MAGIC_SEED: u64 = 0x51CE_C4E5_5EED_2024;

/// Lookup parameters for one square.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicEntry {
    pub mask: u64,
    pub magic: u64,
    pub shift: u32,
    pub offset: usize,
}

impl MagicEntry {
    #[inline]
    fn index(&self, occupancy: u64) -> usize {
        self.offset + (((occupancy & self.mask).wrapping_mul(self.magic)) >> self.shift) as usize
    }
}

/// Magic entries and the shared attack array for one slider type.
pub struct SliderTable {
    entries: [MagicEntry; 64],
    attacks: Vec<u64>,
}

impl SliderTable {
    #[inline]
    pub fn attacks(&self, square: Square, occupancy: u64) -> u64 {
        let entry = &self.entries[square as usize];
        self.attacks[entry.index(occupancy)]
    }

    pub fn entry(&self, square: Square) -> MagicEntry {
        self.entries[square as usize]
    }

    pub fn table_len(&self) -> usize {
        self.attacks.len()
    }
}

pub struct MagicTables {
    pub bishop: SliderTable,
    pub rook: SliderTable,
}

static MAGIC_TABLES: OnceLock<MagicTables> = OnceLock::new();

/// Build the slider tables now instead of on the first lookup.
pub fn init_attack_tables() {
    let _ = magic_tables();
}

#[inline]
pub fn magic_tables() -> &'static MagicTables {
    MAGIC_TABLES.get_or_init(build_magic_tables)
}

/// Relevant-occupancy mask: the slider rays with the final edge square of
/// each ray removed, since a piece there never changes the attack set.
pub fn relevant_occupancy_mask(directions: &[usize], square: Square) -> u64 {
    let mut mask = 0u64;
    for &direction in directions {
        let ray = RAYS[direction][square as usize];
        if ray == 0 {
            continue;
        }
        let edge = if is_positive_direction(direction) {
            63 - ray.leading_zeros()
        } else {
            ray.trailing_zeros()
        };
        mask |= ray & !(1u64 << edge);
    }
    mask
}

fn build_magic_tables() -> MagicTables {
    let mut rng = StdRng::seed_from_u64(MAGIC_SEED);
    let bishop = build_slider_table(&DIAGONAL_DIRECTIONS, &mut rng);
    let rook = build_slider_table(&ORTHOGONAL_DIRECTIONS, &mut rng);

    debug!(
        bishop_entries = bishop.table_len(),
        rook_entries = rook.table_len(),
        "magic slider tables built"
    );

    MagicTables { bishop, rook }
}

fn build_slider_table(directions: &[usize], rng: &mut StdRng) -> SliderTable {
    let mut entries = [MagicEntry::default(); 64];
    let mut attacks = Vec::new();

    for square in 0..64u8 {
        let mask = relevant_occupancy_mask(directions, square);
        let bits = mask.count_ones();
        let shift = 64 - bits;

        let (magic, local) = find_magic(directions, square, mask, shift, rng);
        entries[square as usize] = MagicEntry {
            mask,
            magic,
            shift,
            offset: attacks.len(),
        };
        attacks.extend_from_slice(&local);
    }

    SliderTable { entries, attacks }
}

/// Every subset of `mask` paired with its reference attack set.
fn enumerate_subsets(directions: &[usize], square: Square, mask: u64) -> Vec<(u64, u64)> {
    let mut subsets = Vec::with_capacity(1usize << mask.count_ones());
    let mut subset = 0u64;
    loop {
        subsets.push((
            subset,
            sliding_attacks_reference(directions, square, subset),
        ));
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

fn find_magic(
    directions: &[usize],
    square: Square,
    mask: u64,
    shift: u32,
    rng: &mut StdRng,
) -> (u64, Vec<u64>) {
    let subsets = enumerate_subsets(directions, square, mask);
    let size = 1usize << (64 - shift);
    let mut table = vec![0u64; size];
    let mut epoch = vec![0u32; size];
    let mut attempt = 0u32;

    loop {
        let candidate = rng.next_u64() & rng.next_u64() & rng.next_u64();
        if (mask.wrapping_mul(candidate) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }

        attempt += 1;
        let mut collision = false;
        for &(occupancy, attack) in &subsets {
            let index = ((occupancy.wrapping_mul(candidate)) >> shift) as usize;
            if epoch[index] != attempt {
                epoch[index] = attempt;
                table[index] = attack;
            } else if table[index] != attack {
                collision = true;
                break;
            }
        }

        if !collision {
            return (candidate, table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevant_masks_have_expected_sizes() {
        assert_eq!(relevant_occupancy_mask(&ORTHOGONAL_DIRECTIONS, 0).count_ones(), 12);
        assert_eq!(relevant_occupancy_mask(&ORTHOGONAL_DIRECTIONS, 27).count_ones(), 10);
        assert_eq!(relevant_occupancy_mask(&DIAGONAL_DIRECTIONS, 27).count_ones(), 9);
        assert_eq!(relevant_occupancy_mask(&DIAGONAL_DIRECTIONS, 0).count_ones(), 6);
    }

    #[test]
    fn every_subset_maps_to_reference_attacks() {
        let tables = magic_tables();
        for square in [0u8, 7, 27, 36, 63] {
            let mask = relevant_occupancy_mask(&ORTHOGONAL_DIRECTIONS, square);
            for (occupancy, expected) in enumerate_subsets(&ORTHOGONAL_DIRECTIONS, square, mask) {
                assert_eq!(tables.rook.attacks(square, occupancy), expected);
            }
            let mask = relevant_occupancy_mask(&DIAGONAL_DIRECTIONS, square);
            for (occupancy, expected) in enumerate_subsets(&DIAGONAL_DIRECTIONS, square, mask) {
                assert_eq!(tables.bishop.attacks(square, occupancy), expected);
            }
        }
    }

    #[test]
    fn table_sizes_match_mask_widths() {
        let tables = magic_tables();
        let rook_total: usize = (0..64u8)
            .map(|sq| 1usize << tables.rook.entry(sq).mask.count_ones())
            .sum();
        assert_eq!(tables.rook.table_len(), rook_total);
        assert_eq!(tables.rook.table_len(), 102_400);
        assert_eq!(tables.bishop.table_len(), 5_248);
    }
}
