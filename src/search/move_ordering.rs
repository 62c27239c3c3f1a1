//! Move ordering, killer moves and late-move-reduction policy.
//!
//! Each move is scored once and the list is stably sorted so equal-tier
//! moves keep generator order. Tiers, best first: hash move, captures (by
//! SEE, then MVV-LVA, so losing captures close the tier), promotions,
//! checks, killers, castles, quiet moves.

use std::time::Duration;

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::move_descriptions::{
    move_captured_piece, move_gives_check, move_identity, move_is_capture, move_is_castle,
    move_is_promotion, move_moved_piece, move_promotion_piece, move_to, MoveList, MAX_MOVES,
    NULL_MOVE,
};
use crate::search::iterative_deepening::MAX_PLY;
use crate::search::static_exchange::{see, see_value};

const HASH_MOVE_SCORE: i32 = 1_000_000;
const CAPTURE_SCORE: i32 = 800_000;
const CAPTURE_SEE_BOUND: i32 = 2_000;
const PROMOTION_SCORE: i32 = 700_000;
const CHECK_SCORE: i32 = 600_000;
const KILLER_SCORES: [i32; 2] = [500_000, 490_000];
const CASTLE_SCORE: i32 = 400_000;

/// Number of moves searched at full depth before reductions start.
pub const LMR_LIMIT: usize = 4;

/// Two quiet moves per ply that recently caused a beta cutoff.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY + 1],
}

impl Default for KillerTable {
    fn default() -> Self {
        Self {
            slots: [[NULL_MOVE; 2]; MAX_PLY + 1],
        }
    }
}

impl KillerTable {
    pub fn clear(&mut self) {
        self.slots.fill([NULL_MOVE; 2]);
    }

    #[inline]
    pub fn killers_at(&self, ply: usize) -> [Move; 2] {
        self.slots.get(ply).copied().unwrap_or([NULL_MOVE; 2])
    }

    pub fn record(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if move_identity(slot[0]) == move_identity(mv) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = mv;
    }
}

#[inline]
fn mvv_lva(mv: Move) -> i32 {
    let victim = move_captured_piece(mv).map_or(0, |kind| kind.index() as i32);
    victim * 8 - move_moved_piece(mv).index() as i32
}

/// Ordering key of `mv`; larger sorts first.
pub fn move_order_score(
    game_state: &GameState,
    mv: Move,
    hash_move: Option<Move>,
    killers: [Move; 2],
) -> i32 {
    let identity = move_identity(mv);
    if hash_move.is_some_and(|hash| move_identity(hash) == identity) {
        return HASH_MOVE_SCORE;
    }

    if move_is_capture(mv) {
        let exchange = see(game_state, mv).clamp(-CAPTURE_SEE_BOUND, CAPTURE_SEE_BOUND);
        return CAPTURE_SCORE + exchange * 32 + mvv_lva(mv);
    }
    if let Some(promotion) = move_promotion_piece(mv) {
        return PROMOTION_SCORE + see_value(promotion);
    }
    if move_gives_check(mv) {
        return CHECK_SCORE;
    }
    for (slot, killer) in killers.iter().enumerate() {
        if *killer != NULL_MOVE && move_identity(*killer) == identity {
            return KILLER_SCORES[slot];
        }
    }
    if move_is_castle(mv) {
        return CASTLE_SCORE;
    }
    0
}

/// Sort `list` in place, best first.
pub fn order_moves(
    game_state: &GameState,
    list: &mut MoveList,
    hash_move: Option<Move>,
    killers: [Move; 2],
) {
    let mut scored = [(0i32, NULL_MOVE); MAX_MOVES];
    let len = list.len();
    for (slot, mv) in scored.iter_mut().zip(list.iter()) {
        *slot = (move_order_score(game_state, mv, hash_move, killers), mv);
    }
    scored[..len].sort_by(|a, b| b.0.cmp(&a.0));
    for (target, (_, mv)) in list.as_mut_slice().iter_mut().zip(scored[..len].iter()) {
        *target = *mv;
    }
}

/// Moves that are never reduced: tactical moves and advanced pawn pushes.
pub fn is_interesting(game_state: &GameState, mv: Move) -> bool {
    if move_is_capture(mv) || move_is_promotion(mv) || move_is_castle(mv) || move_gives_check(mv)
    {
        return true;
    }
    move_moved_piece(mv) == PieceKind::Pawn
        && game_state.side_to_move.relative_rank(move_to(mv)) >= 5
}

/// Plies removed from an interior late move at `depth`, `move_number` being
/// its zero-based position in the ordered list.
pub const fn reduction(depth: i32, move_number: usize) -> i32 {
    if depth < 2 {
        return 0;
    }
    if depth < 4 {
        return if move_number > 9 { 1 } else { 0 };
    }
    if depth < 7 {
        return if move_number < 9 { 1 } else { 2 };
    }
    if move_number < 12 {
        1
    } else if move_number < 24 {
        2
    } else {
        3
    }
}

/// Reduction applied to late root moves.
pub const fn root_reduction(depth: i32, move_number: usize) -> i32 {
    if depth < 3 {
        0
    } else if depth < 6 {
        if move_number < 9 {
            1
        } else {
            2
        }
    } else if move_number < 8 {
        2
    } else {
        3
    }
}

/// Root moves ranked by how long their subtree took in the previous
/// iteration, with the last best move pinned to the front.
#[derive(Debug, Clone, Default)]
pub struct RootMoveOrder {
    entries: Vec<(Move, Duration)>,
}

impl RootMoveOrder {
    pub fn new(list: &MoveList) -> Self {
        Self {
            entries: list.iter().map(|mv| (mv, Duration::ZERO)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Move> {
        self.entries.get(index).map(|(mv, _)| *mv)
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.entries.iter().map(|(mv, _)| *mv)
    }

    pub fn record_time(&mut self, index: usize, elapsed: Duration) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.1 = elapsed;
        }
    }

    /// Best move first, the rest by descending subtree time (stable).
    pub fn sort(&mut self, best_move: Option<Move>) {
        if let Some(best) = best_move {
            let wanted = move_identity(best);
            if let Some(pos) = self.entries.iter().position(|(mv, _)| move_identity(*mv) == wanted) {
                self.entries[..=pos].rotate_right(1);
            }
        }
        if self.entries.len() > 1 {
            self.entries[1..].sort_by(|a, b| b.1.cmp(&a.1));
        }
    }

    /// Forget timings, keeping the current order.
    pub fn reset_times(&mut self) {
        for entry in &mut self.entries {
            entry.1 = Duration::ZERO;
        }
    }
}
