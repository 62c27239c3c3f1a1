//! Capture-only search past the nominal horizon.

use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::{make_move_in_place, unmake_move_in_place};
use crate::move_generation::legal_move_generator::{
    generate_legal_captures, generate_legal_moves, has_legal_moves,
};
use crate::moves::move_descriptions::{MoveList, NULL_MOVE};
use crate::search::draw_detection::draw_score;
use crate::search::iterative_deepening::{terminal_score, SearchContext, MAX_PLY};
use crate::search::move_ordering::order_moves;
use crate::search::static_exchange::see;

/// Captures tried before losing exchanges start being skipped.
pub const QS_BAD_CAPTURE_ALLOWANCE: usize = 2;

/// Fail-hard quiescence search. While in check every evasion is searched
/// and standing pat is not allowed.
pub(crate) fn quiescence(
    ctx: &mut SearchContext<'_>,
    game_state: &mut GameState,
    mut alpha: i32,
    beta: i32,
    ply: usize,
) -> Option<i32> {
    ctx.enter_node()?;

    if !has_legal_moves(game_state) {
        return Some(terminal_score(game_state, ply));
    }
    if let Some(score) = draw_score(game_state) {
        return Some(score);
    }

    let in_check = game_state.is_in_check();
    let mut list = MoveList::new();
    if in_check {
        generate_legal_moves(game_state, &mut list);
    } else {
        let stand_pat = ctx.scorer.score(game_state);
        if ply >= MAX_PLY || stand_pat >= beta {
            return Some(stand_pat);
        }
        generate_legal_captures(game_state, &mut list);
        if list.is_empty() {
            return Some(stand_pat);
        }
        alpha = alpha.max(stand_pat);
    }
    if ply >= MAX_PLY {
        return Some(ctx.scorer.score(game_state));
    }

    order_moves(game_state, &mut list, None, [NULL_MOVE; 2]);

    for (index, mv) in list.iter().enumerate() {
        if !in_check && index >= QS_BAD_CAPTURE_ALLOWANCE && see(game_state, mv) < 0 {
            continue;
        }

        make_move_in_place(game_state, mv);
        let score = quiescence(ctx, game_state, -beta, -alpha, ply + 1);
        unmake_move_in_place(game_state);
        let score = -score?;

        if score >= beta {
            return Some(beta);
        }
        alpha = alpha.max(score);
    }

    Some(alpha)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::search::board_scoring::MaterialScorer;
    use crate::search::iterative_deepening::{checkmate_score, VALUE_INF};
    use crate::search::threading::SharedTranspositionTable;

    fn qsearch(fen: &str) -> i32 {
        let mut game = GameState::from_fen(fen).expect("FEN should parse");
        let stop = AtomicBool::new(false);
        let table = SharedTranspositionTable::new_with_mb(1, 1);
        let mut ctx = SearchContext::new(None, &stop, None, &table, &MaterialScorer);
        quiescence(&mut ctx, &mut game, -VALUE_INF, VALUE_INF, 0).expect("search should finish")
    }

    #[test]
    fn quiet_position_stands_pat() {
        assert_eq!(qsearch("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"), 100);
    }

    #[test]
    fn resolves_capture_chain() {
        // Rxd5 wins the undefended knight and nothing can recapture.
        assert_eq!(qsearch("4k3/8/8/3np3/8/8/8/3RK3 w - - 0 1"), 500 - 100);
    }

    #[test]
    fn declines_losing_capture() {
        // Qxd5 would drop the queen to the c6 pawn.
        assert_eq!(qsearch("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1"), 900 - 200);
    }

    #[test]
    fn checkmate_inside_quiescence() {
        let mated = "7k/6Q1/6K1/8/8/8/8/8 b - - 0 1";
        assert_eq!(qsearch(mated), checkmate_score(0));
    }

    #[test]
    fn stop_flag_unwinds() {
        let mut game = GameState::new_game();
        let stop = AtomicBool::new(true);
        let table = SharedTranspositionTable::new_with_mb(1, 1);
        let mut ctx = SearchContext::new(None, &stop, None, &table, &MaterialScorer);
        assert_eq!(quiescence(&mut ctx, &mut game, -VALUE_INF, VALUE_INF, 0), None);
    }
}
