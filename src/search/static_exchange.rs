//! Static exchange evaluation: the material result of the capture sequence
//! a move starts on its destination square, both sides always recapturing
//! with their least valuable attacker and free to stop when behind.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_checks::all_attackers_to;
use crate::moves::move_descriptions::{
    move_captured_piece, move_from, move_is_castle, move_moved_piece, move_promotion_piece,
    move_to,
};
use crate::moves::slider_attacks::{bishop_attacks, rook_attacks};

/// Exchange values, with the king outweighing any sequence of trades.
pub const SEE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20_000];

const MAX_EXCHANGE: usize = 32;

#[inline]
pub const fn see_value(kind: PieceKind) -> i32 {
    SEE_VALUES[kind.index()]
}

/// Expected material gain of `mv` for the side making it.
pub fn see(game_state: &GameState, mv: Move) -> i32 {
    if move_is_castle(mv) {
        return 0;
    }

    let us = game_state.side_to_move;
    let from = move_from(mv);
    let to = move_to(mv);
    let moved = move_moved_piece(mv);

    let mut occupancy = game_state.all_occupied() & !square_bit(from);
    let mut gain = [0i32; MAX_EXCHANGE];
    gain[0] = move_captured_piece(mv).map_or(0, see_value);

    if moved == PieceKind::Pawn && game_state.en_passant_square == Some(to) {
        let victim = match us {
            Color::Light => to - 8,
            Color::Dark => to + 8,
        };
        occupancy &= !square_bit(victim);
    }

    let mut on_square = match move_promotion_piece(mv) {
        Some(promotion) => {
            gain[0] += see_value(promotion) - see_value(PieceKind::Pawn);
            see_value(promotion)
        }
        None => see_value(moved),
    };

    let diagonal = game_state.pieces_of(Color::Light, PieceKind::Bishop)
        | game_state.pieces_of(Color::Dark, PieceKind::Bishop)
        | game_state.pieces_of(Color::Light, PieceKind::Queen)
        | game_state.pieces_of(Color::Dark, PieceKind::Queen);
    let straight = game_state.pieces_of(Color::Light, PieceKind::Rook)
        | game_state.pieces_of(Color::Dark, PieceKind::Rook)
        | game_state.pieces_of(Color::Light, PieceKind::Queen)
        | game_state.pieces_of(Color::Dark, PieceKind::Queen);

    let mut attackers = all_attackers_to(game_state, to, occupancy);
    let mut side = us.opposite();
    let mut depth = 0usize;

    while depth + 1 < MAX_EXCHANGE {
        let Some((square, kind)) = least_valuable_attacker(game_state, attackers, side) else {
            break;
        };
        let others = attackers & game_state.occupancy_by_color[side.opposite().index()];
        if kind == PieceKind::King && others != 0 {
            break;
        }

        depth += 1;
        gain[depth] = on_square - gain[depth - 1];
        if (-gain[depth - 1]).max(gain[depth]) < 0 {
            break;
        }

        occupancy &= !square_bit(square);
        // Sliders lined up behind the piece that just left are now in play.
        attackers |= (bishop_attacks(to, occupancy) & diagonal)
            | (rook_attacks(to, occupancy) & straight);
        attackers &= occupancy;

        on_square = see_value(kind);
        side = side.opposite();
    }

    while depth > 0 {
        gain[depth - 1] = -(-gain[depth - 1]).max(gain[depth]);
        depth -= 1;
    }
    gain[0]
}

fn least_valuable_attacker(
    game_state: &GameState,
    attackers: u64,
    side: Color,
) -> Option<(Square, PieceKind)> {
    ALL_PIECE_KINDS.iter().find_map(|&kind| {
        let candidates = attackers & game_state.pieces_of(side, kind);
        (candidates != 0).then(|| (candidates.trailing_zeros() as Square, kind))
    })
}
