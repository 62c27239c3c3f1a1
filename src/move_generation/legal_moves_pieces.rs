use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_generator::Generation;
use crate::moves::leaper_attacks::knight_attacks;
use crate::moves::move_descriptions::MoveList;
use crate::moves::slider_attacks::{bishop_attacks, queen_attacks, rook_attacks};

/// Knight, bishop, rook and queen moves.
pub(crate) fn generate_piece_moves(generation: &Generation<'_>, list: &mut MoveList) {
    let targets = generation.piece_targets();
    if targets == 0 {
        return;
    }

    for kind in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
    ] {
        let mut pieces = generation.state.pieces_of(generation.info.us, kind);
        // A pinned knight never stays on its pin line.
        if kind == PieceKind::Knight {
            pieces &= !generation.info.pinned;
        }

        while pieces != 0 {
            let from = pieces.trailing_zeros() as Square;
            let mut moves = attacks_for(kind, from, generation.state.occupancy_all)
                & targets
                & generation.info.pin_ray(from);

            while moves != 0 {
                let to = moves.trailing_zeros() as Square;
                generation.emit_simple(list, from, to, kind);
                moves &= moves - 1;
            }
            pieces &= pieces - 1;
        }
    }
}

#[inline]
fn attacks_for(kind: PieceKind, from: Square, occupancy: u64) -> u64 {
    match kind {
        PieceKind::Knight => knight_attacks(from),
        PieceKind::Bishop => bishop_attacks(from, occupancy),
        PieceKind::Rook => rook_attacks(from, occupancy),
        _ => queen_attacks(from, occupancy),
    }
}
