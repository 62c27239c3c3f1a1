//! Canonical chess-rule constants.
//!
//! Starting position, castling geometry and the draw-rule thresholds used by
//! the board model and search.

use crate::game_state::chess_types::*;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Half-move clock value at which the fifty-move rule draws the game.
pub const FIFTY_MOVE_RULE_PLIES: u16 = 100;

pub const RANK_1: u64 = 0x0000_0000_0000_00FF;
pub const RANK_8: u64 = 0xFF00_0000_0000_0000;
pub const BACK_RANKS: u64 = RANK_1 | RANK_8;
pub const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

/// One castling option: which right it consumes and where king and rook travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingMove {
    pub right: CastlingRights,
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    /// Squares that must be empty (between king and rook).
    pub empty_mask: u64,
    /// Squares the king stands on or crosses; none may be attacked.
    pub safe_mask: u64,
}

pub const CASTLING_MOVES: [[CastlingMove; 2]; 2] = [
    [
        CastlingMove {
            right: CASTLE_LIGHT_KINGSIDE,
            king_from: 4,
            king_to: 6,
            rook_from: 7,
            rook_to: 5,
            empty_mask: (1 << 5) | (1 << 6),
            safe_mask: (1 << 4) | (1 << 5) | (1 << 6),
        },
        CastlingMove {
            right: CASTLE_LIGHT_QUEENSIDE,
            king_from: 4,
            king_to: 2,
            rook_from: 0,
            rook_to: 3,
            empty_mask: (1 << 1) | (1 << 2) | (1 << 3),
            safe_mask: (1 << 2) | (1 << 3) | (1 << 4),
        },
    ],
    [
        CastlingMove {
            right: CASTLE_DARK_KINGSIDE,
            king_from: 60,
            king_to: 62,
            rook_from: 63,
            rook_to: 61,
            empty_mask: (1 << 61) | (1 << 62),
            safe_mask: (1 << 60) | (1 << 61) | (1 << 62),
        },
        CastlingMove {
            right: CASTLE_DARK_QUEENSIDE,
            king_from: 60,
            king_to: 58,
            rook_from: 56,
            rook_to: 59,
            empty_mask: (1 << 57) | (1 << 58) | (1 << 59),
            safe_mask: (1 << 58) | (1 << 59) | (1 << 60),
        },
    ],
];

/// Castling rights that survive a piece leaving or arriving on `square`.
///
/// Indexed by square; `rights & CASTLING_RIGHTS_KEEP[from] & CASTLING_RIGHTS_KEEP[to]`
/// updates rights for king moves, rook moves and rook captures in one step.
pub const CASTLING_RIGHTS_KEEP: [CastlingRights; 64] = generate_castling_keep_table();

const fn generate_castling_keep_table() -> [CastlingRights; 64] {
    let mut table = [CASTLE_ALL; 64];
    table[0] = CASTLE_ALL & !CASTLE_LIGHT_QUEENSIDE;
    table[4] = CASTLE_ALL & !(CASTLE_LIGHT_KINGSIDE | CASTLE_LIGHT_QUEENSIDE);
    table[7] = CASTLE_ALL & !CASTLE_LIGHT_KINGSIDE;
    table[56] = CASTLE_ALL & !CASTLE_DARK_QUEENSIDE;
    table[60] = CASTLE_ALL & !(CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE);
    table[63] = CASTLE_ALL & !CASTLE_DARK_KINGSIDE;
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn king_square_clears_both_rights_for_its_color() {
        let rights = CASTLE_ALL & CASTLING_RIGHTS_KEEP[4];
        assert_eq!(rights, CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE);
    }

    #[test]
    fn safe_masks_include_king_origin() {
        for side in CASTLING_MOVES {
            for castle in side {
                assert_ne!(castle.safe_mask & (1u64 << castle.king_from), 0);
                assert_eq!(castle.empty_mask & (1u64 << castle.king_from), 0);
            }
        }
    }
}
