use crate::game_state::chess_rules::CASTLING_MOVES;
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_generator::{Generation, GenerationMode};
use crate::moves::leaper_attacks::king_attacks;
use crate::moves::move_descriptions::{MoveClass, MoveList};

/// King steps onto safe squares, then castling when not in check.
pub(crate) fn generate_king_moves(generation: &Generation<'_>, list: &mut MoveList) {
    let state = generation.state;
    let info = &generation.info;
    let king = info.king;

    let mut targets = king_attacks(king)
        & !state.occupancy_by_color[info.us.index()]
        & !info.enemy_attacks;
    if generation.mode == GenerationMode::Tactical {
        targets &= state.occupancy_by_color[info.them.index()];
    }

    while targets != 0 {
        let to = targets.trailing_zeros() as Square;
        generation.emit_simple(list, king, to, PieceKind::King);
        targets &= targets - 1;
    }

    if generation.mode == GenerationMode::Tactical || info.in_check() {
        return;
    }

    for castle in &CASTLING_MOVES[info.us.index()] {
        if state.castling_rights & castle.right == 0 || castle.king_from != king {
            continue;
        }
        if state.occupancy_all & castle.empty_mask != 0 {
            continue;
        }
        if info.enemy_attacks & castle.safe_mask != 0 {
            continue;
        }
        generation.emit(
            list,
            castle.king_from,
            castle.king_to,
            PieceKind::King,
            None,
            None,
            MoveClass::Castle,
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_move_generator::generate_legal_moves;
    use crate::moves::move_descriptions::{move_class, move_to, MoveClass, MoveList};

    #[test]
    fn king_cannot_retreat_along_checking_ray() {
        let game = GameState::from_fen("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").expect("FEN should parse");
        let mut list = MoveList::new();
        generate_legal_moves(&game, &mut list);
        assert!(list.iter().all(|mv| move_to(mv) != 5));
        assert!(list.iter().any(|mv| move_to(mv) == 12));
    }

    #[test]
    fn both_castles_available_in_open_position() {
        let game =
            GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let mut list = MoveList::new();
        generate_legal_moves(&game, &mut list);
        let castles: Vec<_> = list
            .iter()
            .filter(|&mv| move_class(mv) == MoveClass::Castle)
            .map(move_to)
            .collect();
        assert_eq!(castles.len(), 2);
        assert!(castles.contains(&6) && castles.contains(&2));
    }

    #[test]
    fn no_castling_while_in_check() {
        let game =
            GameState::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let mut list = MoveList::new();
        generate_legal_moves(&game, &mut list);
        assert!(list.iter().all(|mv| move_class(mv) != MoveClass::Castle));
    }
}
