//! Perft: exhaustive legal move tree counting for generator verification.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;

use tracing::debug;

use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::{make_move_in_place, unmake_move_in_place};
use crate::move_generation::legal_move_generator::{
    generate_legal_moves, generate_legal_moves_unannotated, has_legal_moves,
};
use crate::game_state::chess_types::{Move, PieceKind};
use crate::moves::move_descriptions::{
    move_class, move_gives_check, move_is_capture, move_moved_piece, move_to, MoveClass,
    MoveList,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

/// Number of leaf positions `depth` plies below `game_state`.
pub fn count_legal_move_trees(game_state: &GameState, depth: u8) -> u64 {
    let mut state = game_state.clone();
    count_recurse(&mut state, depth)
}

fn count_recurse(state: &mut GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut list = MoveList::new();
    generate_legal_moves_unannotated(state, &mut list);
    if depth == 1 {
        return list.len() as u64;
    }

    let mut total = 0;
    for mv in &list {
        make_move_in_place(state, mv);
        total += count_recurse(state, depth - 1);
        unmake_move_in_place(state);
    }
    total
}

/// Perft with per-leaf move statistics (captures, checks, mates, ...).
pub fn perft_legal(game_state: &GameState, depth: u8) -> PerftCounts {
    let mut state = game_state.clone();
    let mut counts = PerftCounts::default();
    if depth == 0 {
        counts.nodes = 1;
        return counts;
    }
    perft_recurse(&mut state, depth, &mut counts);
    counts
}

fn perft_recurse(state: &mut GameState, depth: u8, counts: &mut PerftCounts) {
    let mut list = MoveList::new();
    generate_legal_moves(state, &mut list);

    for mv in &list {
        if depth == 1 {
            record_leaf(state, mv, counts);
            continue;
        }
        make_move_in_place(state, mv);
        perft_recurse(state, depth - 1, counts);
        unmake_move_in_place(state);
    }
}

fn record_leaf(state: &mut GameState, mv: Move, counts: &mut PerftCounts) {
    counts.nodes += 1;
    if move_is_capture(mv) {
        counts.captures += 1;
        if move_moved_piece(mv) == PieceKind::Pawn && state.en_passant_square == Some(move_to(mv)) {
            counts.en_passant += 1;
        }
    }
    match move_class(mv) {
        MoveClass::Castle => counts.castles += 1,
        MoveClass::Promotion => counts.promotions += 1,
        _ => {}
    }
    if move_gives_check(mv) {
        counts.checks += 1;
        make_move_in_place(state, mv);
        if !has_legal_moves(state) {
            counts.checkmates += 1;
        }
        unmake_move_in_place(state);
    }
}

/// Leaf counts below each root move.
pub fn perft_divide(game_state: &GameState, depth: u8) -> Vec<(Move, u64)> {
    let mut state = game_state.clone();
    let mut list = MoveList::new();
    generate_legal_moves(&state, &mut list);

    list.iter()
        .map(|mv| {
            make_move_in_place(&mut state, mv);
            let nodes = count_recurse(&mut state, depth.saturating_sub(1));
            unmake_move_in_place(&mut state);
            (mv, nodes)
        })
        .collect()
}

/// `count_legal_move_trees` with root moves claimed by `threads` scoped
/// workers, each on its own copy of the position.
pub fn perft_multi_threaded(game_state: &GameState, depth: u8, threads: usize) -> u64 {
    if depth <= 1 {
        return count_legal_move_trees(game_state, depth);
    }

    let mut root = MoveList::new();
    generate_legal_moves_unannotated(game_state, &mut root);
    let workers = threads.clamp(1, root.len().max(1));
    let cursor = AtomicUsize::new(0);
    let total = AtomicU64::new(0);

    thread::scope(|scope| {
        for worker in 0..workers {
            let root = &root;
            let cursor = &cursor;
            let total = &total;
            scope.spawn(move || {
                let mut state = game_state.clone();
                let mut local = 0u64;
                while let Some(mv) = root.get(cursor.fetch_add(1, Ordering::Relaxed)) {
                    make_move_in_place(&mut state, mv);
                    local += count_recurse(&mut state, depth - 1);
                    unmake_move_in_place(&mut state);
                }
                debug!(worker, nodes = local, "perft worker finished");
                total.fetch_add(local, Ordering::Relaxed);
            });
        }
    });

    total.load(Ordering::Relaxed)
}

/// Sum of several statistics runs, used when callers split work themselves.
pub fn merge_counts(parts: impl IntoIterator<Item = PerftCounts>) -> PerftCounts {
    let mut total = PerftCounts::default();
    for part in parts {
        total.merge(part);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_zero_counts_single_node() {
        let game = GameState::new_game();
        assert_eq!(count_legal_move_trees(&game, 0), 1);
        assert_eq!(perft_legal(&game, 0).nodes, 1);
    }

    #[test]
    fn starting_position_shallow_counts() {
        let game = GameState::new_game();
        assert_eq!(count_legal_move_trees(&game, 1), 20);
        assert_eq!(count_legal_move_trees(&game, 2), 400);
        assert_eq!(count_legal_move_trees(&game, 3), 8_902);
    }

    #[test]
    fn kiwipete_depth_two_statistics() {
        let game = GameState::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 0",
        )
        .expect("FEN should parse");
        let counts = perft_legal(&game, 2);
        assert_eq!(
            counts,
            PerftCounts {
                nodes: 2_039,
                captures: 351,
                en_passant: 1,
                castles: 91,
                promotions: 0,
                checks: 3,
                checkmates: 0,
            }
        );
    }

    #[test]
    fn divide_sums_to_total_and_threads_agree() {
        let game = GameState::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1")
            .expect("FEN should parse");
        let divided = perft_divide(&game, 3);
        assert_eq!(divided.len(), 14);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<u64>(), 2_812);
        assert_eq!(perft_multi_threaded(&game, 3, 4), 2_812);
        assert_eq!(merge_counts([perft_legal(&game, 1), perft_legal(&game, 1)]).nodes, 28);
    }
}
