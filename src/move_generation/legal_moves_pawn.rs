use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_generator::{Generation, GenerationMode};
use crate::moves::leaper_attacks::pawn_attacks;
use crate::moves::move_descriptions::{MoveClass, MoveList};
use crate::moves::slider_attacks::{bishop_attacks, rook_attacks};

/// Pushes, double pushes, captures, promotions and en passant.
pub(crate) fn generate_pawn_moves(generation: &Generation<'_>, list: &mut MoveList) {
    let state = generation.state;
    let info = &generation.info;
    let us = info.us;
    let enemy = state.occupancy_by_color[info.them.index()];
    let empty = !state.occupancy_all;
    let tactical = generation.mode == GenerationMode::Tactical;

    let mut pawns = state.pieces_of(us, PieceKind::Pawn);
    while pawns != 0 {
        let from = pawns.trailing_zeros() as Square;
        pawns &= pawns - 1;

        let allowed = info.check_mask & info.pin_ray(from);
        let relative_rank = us.relative_rank(from);
        let promotes = relative_rank == 6;

        let single = forward(us, from);
        if square_bit(single) & empty != 0 {
            if square_bit(single) & allowed != 0 {
                if promotes {
                    emit_promotions(generation, list, from, single, None);
                } else if !tactical {
                    generation.emit(list, from, single, PieceKind::Pawn, None, None, MoveClass::Quiet);
                }
            }

            if relative_rank == 1 && !tactical {
                let double = forward(us, single);
                if square_bit(double) & empty & allowed != 0 {
                    generation.emit(list, from, double, PieceKind::Pawn, None, None, MoveClass::Quiet);
                }
            }
        }

        let mut captures = pawn_attacks(us, from) & enemy & allowed;
        while captures != 0 {
            let to = captures.trailing_zeros() as Square;
            captures &= captures - 1;
            let captured = state.piece_on(to).map(|(_, kind)| kind);
            if promotes {
                emit_promotions(generation, list, from, to, captured);
            } else {
                generation.emit(list, from, to, PieceKind::Pawn, captured, None, MoveClass::Capture);
            }
        }

        if let Some(ep) = state.en_passant_square {
            if pawn_attacks(us, from) & square_bit(ep) != 0 && en_passant_is_legal(generation, from, ep) {
                generation.emit(
                    list,
                    from,
                    ep,
                    PieceKind::Pawn,
                    Some(PieceKind::Pawn),
                    None,
                    MoveClass::Capture,
                );
            }
        }
    }
}

#[inline]
fn forward(color: Color, square: Square) -> Square {
    match color {
        Color::Light => square + 8,
        Color::Dark => square - 8,
    }
}

fn emit_promotions(
    generation: &Generation<'_>,
    list: &mut MoveList,
    from: Square,
    to: Square,
    captured: Option<PieceKind>,
) {
    for promotion in PROMOTION_PIECE_KINDS {
        generation.emit(
            list,
            from,
            to,
            PieceKind::Pawn,
            captured,
            Some(promotion),
            MoveClass::Promotion,
        );
    }
}

/// En passant removes two pawns from one rank at once, which the pin and
/// check masks cannot model. Rebuild the occupancy after the capture and ask
/// whether any enemy slider now sees the king.
fn en_passant_is_legal(generation: &Generation<'_>, from: Square, ep: Square) -> bool {
    let state = generation.state;
    let info = &generation.info;
    let captured = match info.us {
        Color::Light => ep - 8,
        Color::Dark => ep + 8,
    };

    // Evading a check requires capturing the checker or landing on the line.
    if info.check_mask & (square_bit(ep) | square_bit(captured)) == 0 {
        return false;
    }
    if info.pin_ray(from) & square_bit(ep) == 0 {
        return false;
    }

    let occupancy =
        (state.occupancy_all & !square_bit(from) & !square_bit(captured)) | square_bit(ep);
    let them = info.them;
    let line = state.pieces_of(them, PieceKind::Rook) | state.pieces_of(them, PieceKind::Queen);
    let diagonal =
        state.pieces_of(them, PieceKind::Bishop) | state.pieces_of(them, PieceKind::Queen);

    rook_attacks(info.king, occupancy) & line == 0
        && bishop_attacks(info.king, occupancy) & diagonal == 0
}

#[cfg(test)]
mod tests {
    use crate::game_state::chess_types::PieceKind;
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_move_generator::generate_legal_moves;
    use crate::moves::move_descriptions::{
        move_captured_piece, move_class, move_moved_piece, move_promotion_piece, move_to,
        MoveClass, MoveList,
    };

    fn legal(fen: &str) -> MoveList {
        let game = GameState::from_fen(fen).expect("FEN should parse");
        let mut list = MoveList::new();
        generate_legal_moves(&game, &mut list);
        list
    }

    #[test]
    fn promotion_capture_encodes_both_pieces() {
        let list = legal("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let capture_promotions: Vec<_> = list
            .iter()
            .filter(|&mv| move_class(mv) == MoveClass::Promotion && move_to(mv) == 57)
            .collect();
        assert_eq!(capture_promotions.len(), 4);
        for mv in capture_promotions {
            assert_eq!(move_captured_piece(mv), Some(PieceKind::Rook));
            assert!(move_promotion_piece(mv).is_some());
        }
        // Straight push to a8 promotes too.
        assert_eq!(
            list.iter()
                .filter(|&mv| move_class(mv) == MoveClass::Promotion && move_to(mv) == 56)
                .count(),
            4
        );
    }

    #[test]
    fn double_push_requires_both_squares_empty() {
        let list = legal("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1");
        assert!(list
            .iter()
            .all(|mv| move_moved_piece(mv) != PieceKind::Pawn));
    }

    #[test]
    fn en_passant_captures_checking_pawn() {
        // d7-d5 gave check to the king on e4; exd6 removes the checker.
        let list = legal("4k3/8/8/3pP3/4K3/8/8/8 w - d6 0 1");
        assert!(list
            .iter()
            .any(|mv| move_to(mv) == 43 && move_moved_piece(mv) == PieceKind::Pawn));
    }

    #[test]
    fn dark_pawns_move_down_the_board() {
        let list = legal("4k3/4p3/8/8/8/8/8/4K3 b - - 0 1");
        let pawn_targets: Vec<_> = list
            .iter()
            .filter(|&mv| move_moved_piece(mv) == PieceKind::Pawn)
            .map(move_to)
            .collect();
        assert_eq!(pawn_targets.len(), 2);
        assert!(pawn_targets.contains(&44) && pawn_targets.contains(&36));
    }
}
