//! Attack, check and pin analysis shared by move generation, search and
//! notation.
//!
//! `CheckInfo` is computed once per generation call for the side to move:
//! squares the enemy attacks, the checking pieces with the matching evasion
//! mask, and the set of pinned friendly pieces. `CheckSquares` is the mirror
//! image for the enemy king and answers "does this move give check".

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::leaper_attacks::{king_attacks, knight_attacks, pawn_attacks};
use crate::moves::move_descriptions::{
    move_from, move_moved_piece, move_promotion_piece, move_to, MoveClass,
};
use crate::moves::ray_masks::{between, line_through, DIAGONAL_RAYS, LINE_RAYS};
use crate::moves::slider_attacks::{bishop_attacks, queen_attacks, rook_attacks};
use crate::game_state::chess_rules::CASTLING_MOVES;

#[inline]
fn diagonal_sliders(game_state: &GameState, color: Color) -> u64 {
    game_state.pieces_of(color, PieceKind::Bishop) | game_state.pieces_of(color, PieceKind::Queen)
}

#[inline]
fn line_sliders(game_state: &GameState, color: Color) -> u64 {
    game_state.pieces_of(color, PieceKind::Rook) | game_state.pieces_of(color, PieceKind::Queen)
}

/// Square of `color`'s king. A structurally valid position always has one;
/// a missing king reads as a1 rather than panicking.
#[inline]
fn king_square_of(game_state: &GameState, color: Color) -> Square {
    (game_state.pieces_of(color, PieceKind::King).trailing_zeros() & 63) as Square
}

/// Pieces of `attacker` that attack `square` given `occupancy`.
pub fn attackers_of(
    game_state: &GameState,
    square: Square,
    attacker: Color,
    occupancy: u64,
) -> u64 {
    (pawn_attacks(attacker.opposite(), square) & game_state.pieces_of(attacker, PieceKind::Pawn))
        | (knight_attacks(square) & game_state.pieces_of(attacker, PieceKind::Knight))
        | (king_attacks(square) & game_state.pieces_of(attacker, PieceKind::King))
        | (bishop_attacks(square, occupancy) & diagonal_sliders(game_state, attacker))
        | (rook_attacks(square, occupancy) & line_sliders(game_state, attacker))
}

/// Attackers of both colors, used by static exchange evaluation.
pub fn all_attackers_to(game_state: &GameState, square: Square, occupancy: u64) -> u64 {
    (attackers_of(game_state, square, Color::Light, occupancy)
        | attackers_of(game_state, square, Color::Dark, occupancy))
        & occupancy
}

#[inline]
pub fn is_square_attacked(
    game_state: &GameState,
    square: Square,
    attacker: Color,
    occupancy: u64,
) -> bool {
    attackers_of(game_state, square, attacker, occupancy) != 0
}

/// Every square attacked by `attacker`, with the defending king removed from
/// the blocker set so it cannot retreat along a checking ray.
pub fn enemy_attacked_squares(game_state: &GameState, attacker: Color) -> u64 {
    let defender_king = game_state.pieces_of(attacker.opposite(), PieceKind::King);
    let occupancy = game_state.occupancy_all & !defender_king;
    let mut attacked = 0u64;

    let mut pawns = game_state.pieces_of(attacker, PieceKind::Pawn);
    while pawns != 0 {
        attacked |= pawn_attacks(attacker, pawns.trailing_zeros() as Square);
        pawns &= pawns - 1;
    }

    let mut knights = game_state.pieces_of(attacker, PieceKind::Knight);
    while knights != 0 {
        attacked |= knight_attacks(knights.trailing_zeros() as Square);
        knights &= knights - 1;
    }

    let mut diagonal = diagonal_sliders(game_state, attacker);
    while diagonal != 0 {
        attacked |= bishop_attacks(diagonal.trailing_zeros() as Square, occupancy);
        diagonal &= diagonal - 1;
    }

    let mut straight = line_sliders(game_state, attacker);
    while straight != 0 {
        attacked |= rook_attacks(straight.trailing_zeros() as Square, occupancy);
        straight &= straight - 1;
    }

    let king = game_state.pieces_of(attacker, PieceKind::King);
    if king != 0 {
        attacked |= king_attacks(king.trailing_zeros() as Square);
    }

    attacked
}

/// Checking pieces and the squares a non-king move must land on.
///
/// No checkers: every square. One checker: the checker plus the squares
/// between it and the king (empty for leapers). Two or more: nothing.
pub fn checkers_and_mask(game_state: &GameState, color: Color) -> (u64, u64) {
    let king = king_square_of(game_state, color);
    let checkers = attackers_of(game_state, king, color.opposite(), game_state.occupancy_all);

    let mask = match checkers.count_ones() {
        0 => u64::MAX,
        1 => checkers | between(king, checkers.trailing_zeros() as Square),
        _ => 0,
    };

    (checkers, mask)
}

/// Friendly pieces that are the only blocker between their king and an enemy
/// slider moving along that line.
pub fn pinned_pieces(game_state: &GameState, color: Color) -> u64 {
    let king = king_square_of(game_state, color);
    let them = color.opposite();
    let snipers = (LINE_RAYS[king as usize] & line_sliders(game_state, them))
        | (DIAGONAL_RAYS[king as usize] & diagonal_sliders(game_state, them));
    slider_blockers(game_state, king, snipers) & game_state.occupancy_by_color[color.index()]
}

/// Single blockers between `target` and any of `snipers`, of either color.
fn slider_blockers(game_state: &GameState, target: Square, snipers: u64) -> u64 {
    let mut blockers = 0u64;
    let mut remaining = snipers;
    while remaining != 0 {
        let sniper = remaining.trailing_zeros() as Square;
        let on_line = between(target, sniper) & game_state.occupancy_all;
        if on_line.count_ones() == 1 {
            blockers |= on_line;
        }
        remaining &= remaining - 1;
    }
    blockers
}

/// Per-call legality context for the side to move.
#[derive(Debug, Clone, Copy)]
pub struct CheckInfo {
    pub us: Color,
    pub them: Color,
    pub king: Square,
    pub checkers: u64,
    pub check_mask: u64,
    pub pinned: u64,
    pub enemy_attacks: u64,
}

impl CheckInfo {
    pub fn new(game_state: &GameState) -> Self {
        let us = game_state.side_to_move;
        let them = us.opposite();
        let (checkers, check_mask) = checkers_and_mask(game_state, us);

        Self {
            us,
            them,
            king: king_square_of(game_state, us),
            checkers,
            check_mask,
            pinned: pinned_pieces(game_state, us),
            enemy_attacks: enemy_attacked_squares(game_state, them),
        }
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.checkers != 0
    }

    #[inline]
    pub fn in_double_check(&self) -> bool {
        self.checkers.count_ones() > 1
    }

    /// Squares a piece on `square` may move to without exposing the king.
    #[inline]
    pub fn pin_ray(&self, square: Square) -> u64 {
        if self.pinned & square_bit(square) != 0 {
            line_through(self.king, square)
        } else {
            u64::MAX
        }
    }
}

/// Squares from which each piece kind of the side to move would attack the
/// enemy king, plus the friendly pieces whose departure uncovers a slider.
#[derive(Debug, Clone, Copy)]
pub struct CheckSquares {
    enemy_king: Square,
    by_kind: [u64; 6],
    discoverers: u64,
}

impl CheckSquares {
    pub fn new(game_state: &GameState) -> Self {
        let us = game_state.side_to_move;
        let them = us.opposite();
        let enemy_king = king_square_of(game_state, them);
        let occupancy = game_state.occupancy_all;

        let bishop = bishop_attacks(enemy_king, occupancy);
        let rook = rook_attacks(enemy_king, occupancy);
        let by_kind = [
            pawn_attacks(them, enemy_king),
            knight_attacks(enemy_king),
            bishop,
            rook,
            bishop | rook,
            0,
        ];

        let snipers = (LINE_RAYS[enemy_king as usize] & line_sliders(game_state, us))
            | (DIAGONAL_RAYS[enemy_king as usize] & diagonal_sliders(game_state, us));
        let discoverers = slider_blockers(game_state, enemy_king, snipers)
            & game_state.occupancy_by_color[us.index()];

        Self {
            enemy_king,
            by_kind,
            discoverers,
        }
    }

    /// Would `mv` (legal, not yet applied, side to move = mover) check the
    /// enemy king.
    pub fn gives_check(&self, game_state: &GameState, mv: Move, class: MoveClass) -> bool {
        let from = move_from(mv);
        let to = move_to(mv);
        let from_bit = square_bit(from);
        let to_bit = square_bit(to);
        let king_bit = square_bit(self.enemy_king);

        match class {
            MoveClass::Castle => self.castle_gives_check(game_state, from, to),
            MoveClass::Capture
                if move_moved_piece(mv) == PieceKind::Pawn
                    && game_state.en_passant_square == Some(to) =>
            {
                self.en_passant_gives_check(game_state, from, to)
            }
            MoveClass::Promotion => {
                let occupancy = (game_state.occupancy_all & !from_bit) | to_bit;
                let promoted = move_promotion_piece(mv).unwrap_or(PieceKind::Queen);
                let direct = match promoted {
                    PieceKind::Knight => knight_attacks(to),
                    PieceKind::Bishop => bishop_attacks(to, occupancy),
                    PieceKind::Rook => rook_attacks(to, occupancy),
                    _ => queen_attacks(to, occupancy),
                };
                direct & king_bit != 0 || self.discovers(from, to)
            }
            _ => {
                self.by_kind[move_moved_piece(mv).index()] & to_bit != 0
                    || self.discovers(from, to)
            }
        }
    }

    #[inline]
    fn discovers(&self, from: Square, to: Square) -> bool {
        self.discoverers & square_bit(from) != 0
            && line_through(self.enemy_king, from) & square_bit(to) == 0
    }

    fn en_passant_gives_check(&self, game_state: &GameState, from: Square, to: Square) -> bool {
        let us = game_state.side_to_move;
        let captured = match us {
            Color::Light => to - 8,
            Color::Dark => to + 8,
        };
        let occupancy =
            (game_state.occupancy_all & !square_bit(from) & !square_bit(captured)) | square_bit(to);

        pawn_attacks(us, to) & square_bit(self.enemy_king) != 0
            || bishop_attacks(self.enemy_king, occupancy) & diagonal_sliders(game_state, us) != 0
            || rook_attacks(self.enemy_king, occupancy) & line_sliders(game_state, us) != 0
    }

    fn castle_gives_check(&self, game_state: &GameState, king_from: Square, king_to: Square) -> bool {
        let us = game_state.side_to_move;
        let Some(castle) = CASTLING_MOVES[us.index()]
            .iter()
            .find(|castle| castle.king_from == king_from && castle.king_to == king_to)
        else {
            return false;
        };

        let occupancy = (game_state.occupancy_all
            & !square_bit(castle.king_from)
            & !square_bit(castle.rook_from))
            | square_bit(castle.king_to)
            | square_bit(castle.rook_to);
        let rooks_after = (line_sliders(game_state, us) & !square_bit(castle.rook_from))
            | square_bit(castle.rook_to);

        rook_attacks(self.enemy_king, occupancy) & rooks_after != 0
            || bishop_attacks(self.enemy_king, occupancy) & diagonal_sliders(game_state, us) != 0
    }
}
