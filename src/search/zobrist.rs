//! Zobrist keys for incremental position hashing.
//!
//! One key per (color, piece, square), one for dark to move, one per
//! castling right and one per en-passant file. Keys are drawn once from a
//! seeded `StdRng`, so hashes are identical across runs and builds.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::game_state::{chess_types::*, game_state::GameState};

const ZOBRIST_SEED: u64 = 0x51A7_E0F0_2B1D_C0DE;

#[derive(Debug)]
struct ZobristKeys {
    pieces: [[[u64; 64]; 6]; 2],
    dark_to_move: u64,
    castling_rights: [u64; 4],
    en_passant_files: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

#[inline]
fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let mut draw = || rng.next_u64();
        ZobristKeys {
            pieces: std::array::from_fn(|_| std::array::from_fn(|_| std::array::from_fn(|_| draw()))),
            dark_to_move: draw(),
            castling_rights: std::array::from_fn(|_| draw()),
            en_passant_files: std::array::from_fn(|_| draw()),
        }
    })
}

#[inline]
pub fn piece_square_key(color: Color, piece: PieceKind, square: Square) -> u64 {
    keys().pieces[color.index()][piece.index()][square as usize]
}

/// XOR of the keys of every right set in `castling_rights`, so toggling one
/// right changes the hash by exactly that right's key.
#[inline]
pub fn castling_key(castling_rights: CastlingRights) -> u64 {
    let table = &keys().castling_rights;
    (0..4)
        .filter(|&bit| castling_rights & (1 << bit) != 0)
        .fold(0, |acc, bit| acc ^ table[bit])
}

#[inline]
pub fn en_passant_file_key(file: u8) -> u64 {
    keys().en_passant_files[file as usize]
}

/// Toggled whenever the side to move changes; present when dark is to move.
#[inline]
pub fn side_to_move_key() -> u64 {
    keys().dark_to_move
}

/// Compute the position key from scratch by folding every feature key.
///
/// Only used for initialization and verification; `GameState` keeps its key
/// current incrementally through make/unmake.
pub fn compute_zobrist_key(game_state: &GameState) -> u64 {
    let mut key = 0u64;

    for color in [Color::Light, Color::Dark] {
        for piece in ALL_PIECE_KINDS {
            let mut bb = game_state.pieces[color.index()][piece.index()];
            while bb != 0 {
                let sq = bb.trailing_zeros() as Square;
                key ^= piece_square_key(color, piece, sq);
                bb &= bb - 1;
            }
        }
    }

    if game_state.side_to_move == Color::Dark {
        key ^= side_to_move_key();
    }

    key ^= castling_key(game_state.castling_rights);

    if let Some(ep_square) = game_state.en_passant_square {
        key ^= en_passant_file_key(square_file(ep_square));
    }

    key
}

/// Recompute and store the position key on the provided state.
#[inline]
pub fn refresh_zobrist_key(game_state: &mut GameState) {
    game_state.zobrist_key = compute_zobrist_key(game_state);
}
