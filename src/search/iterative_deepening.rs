//! Iterative deepening search with fail-hard negamax alpha-beta pruning.
//!
//! Each iteration runs a full-width root search inside an aspiration window
//! centred on the previous score. Interior nodes consult the transposition
//! table, order moves, reduce late quiet moves and extend forcing lines.
//! Quiescence search resolves captures at the horizon.
//!
//! Every search function returns `Option<i32>`: `None` means the stop flag
//! was raised (deadline or external request) and the caller must unwind
//! without trusting any partial result. Only completed iterations are
//! reported.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::errors::SearchError;
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_apply::{make_move_in_place, unmake_move_in_place};
use crate::move_generation::legal_move_checks::{attackers_of, enemy_attacked_squares};
use crate::move_generation::legal_move_generator::{generate_legal_moves, has_legal_moves};
use crate::moves::move_descriptions::{
    move_is_capture, move_is_promotion, MoveList, NULL_MOVE,
};
use crate::moves::slider_attacks::queen_attacks;
use crate::search::board_scoring::{BoardScorer, MaterialScorer};
use crate::search::draw_detection::{draw_score, VALUE_DRAW};
use crate::search::move_ordering::{
    is_interesting, order_moves, reduction, root_reduction, KillerTable, RootMoveOrder, LMR_LIMIT,
};
use crate::search::quiescence::quiescence;
use crate::search::threading::{lazy_smp_search, SharedTranspositionTable, ThreadingConfig};
use crate::search::transposition_table::{Bound, TTStats};
use crate::utils::san::line_to_san;

pub const VALUE_MATE: i32 = 16_000;
pub const VALUE_INF: i32 = 16_001;
pub const MAX_PLY: usize = 40;
pub const MAX_DEPTH: u8 = 36;
pub const EXTENSION_LIMIT: u8 = 12;
pub const VALUE_WINDOW: i32 = 4;

const NODE_POLL_MASK: u64 = 1023;

/// Score of being checkmated `ply` half-moves from the root.
#[inline]
pub const fn checkmate_score(ply: usize) -> i32 {
    -VALUE_MATE + 20 * ply as i32
}

#[inline]
pub const fn is_mate_score(score: i32) -> bool {
    score.abs() >= VALUE_MATE - 20 * MAX_PLY as i32
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub time_budget: Option<Duration>,
    pub threading: ThreadingConfig,
    pub hash_mb: usize,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            time_budget: None,
            threading: ThreadingConfig::default(),
            hash_mb: 16,
            stop_flag: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
    /// Deepest fully completed iteration; 0 when even depth 1 timed out.
    pub depth: u8,
    pub principal_variation: Vec<Move>,
    pub nodes: u64,
    pub elapsed: Duration,
    pub tt_stats: TTStats,
}

/// Triangular table of principal variations, one row per ply.
#[derive(Debug, Clone)]
pub(crate) struct PvTable {
    moves: [[Move; MAX_PLY + 1]; MAX_PLY + 1],
    lengths: [usize; MAX_PLY + 1],
}

impl Default for PvTable {
    fn default() -> Self {
        Self {
            moves: [[NULL_MOVE; MAX_PLY + 1]; MAX_PLY + 1],
            lengths: [0; MAX_PLY + 1],
        }
    }
}

impl PvTable {
    #[inline]
    fn clear_ply(&mut self, ply: usize) {
        if ply <= MAX_PLY {
            self.lengths[ply] = ply;
        }
    }

    fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        self.moves[ply][ply] = mv;
        let child_len = self.lengths[ply + 1].max(ply + 1);
        for index in ply + 1..child_len {
            self.moves[ply][index] = self.moves[ply + 1][index];
        }
        self.lengths[ply] = child_len;
    }

    /// Best line found below `ply` in the most recent search of that ply.
    pub(crate) fn line_from(&self, ply: usize) -> Vec<Move> {
        if ply > MAX_PLY {
            return Vec::new();
        }
        self.moves[ply][ply..self.lengths[ply].max(ply)].to_vec()
    }

    pub(crate) fn root_line(&self) -> Vec<Move> {
        self.line_from(0)
    }
}

/// Per-worker search handle threaded through the recursion.
pub(crate) struct SearchContext<'a> {
    deadline: Option<Instant>,
    stop: &'a AtomicBool,
    external_stop: Option<&'a AtomicBool>,
    pub(crate) table: &'a SharedTranspositionTable,
    pub(crate) scorer: &'a dyn BoardScorer,
    pub(crate) nodes: u64,
    pub(crate) killers: KillerTable,
    pub(crate) pv: PvTable,
}

impl<'a> SearchContext<'a> {
    pub(crate) fn new(
        deadline: Option<Instant>,
        stop: &'a AtomicBool,
        external_stop: Option<&'a AtomicBool>,
        table: &'a SharedTranspositionTable,
        scorer: &'a dyn BoardScorer,
    ) -> Self {
        Self {
            deadline,
            stop,
            external_stop,
            table,
            scorer,
            nodes: 0,
            killers: KillerTable::default(),
            pv: PvTable::default(),
        }
    }

    /// Count a node; `None` once the search must unwind.
    #[inline]
    pub(crate) fn enter_node(&mut self) -> Option<()> {
        self.nodes += 1;
        if self.nodes & NODE_POLL_MASK == 0
            && self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.stop.store(true, Ordering::Relaxed);
        }
        (!self.stopped()).then_some(())
    }

    #[inline]
    pub(crate) fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
            || self.external_stop.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Score of a position with no legal moves.
#[inline]
pub(crate) fn terminal_score(game_state: &GameState, ply: usize) -> i32 {
    if game_state.is_in_check() {
        checkmate_score(ply)
    } else {
        VALUE_DRAW
    }
}

/// A queen of the side to move attacked by a lesser piece with nowhere safe
/// to go.
fn has_trapped_queen(game_state: &GameState) -> bool {
    let us = game_state.side_to_move;
    let them = us.opposite();
    let mut queens = game_state.pieces_of(us, PieceKind::Queen);
    if queens == 0 {
        return false;
    }

    let occupancy = game_state.all_occupied();
    let enemy_attacks = enemy_attacked_squares(game_state, them);
    let enemy_queens = game_state.pieces_of(them, PieceKind::Queen);
    while queens != 0 {
        let square = queens.trailing_zeros() as Square;
        queens &= queens - 1;

        let harassers = attackers_of(game_state, square, them, occupancy) & !enemy_queens;
        if harassers == 0 {
            continue;
        }
        let flight = queen_attacks(square, occupancy)
            & !game_state.occupancy_by_color[us.index()]
            & !enemy_attacks;
        if flight == 0 {
            return true;
        }
    }
    false
}

/// Interior node search. `extensions` counts plies already added on the
/// path from the root.
pub(crate) fn alpha_beta(
    ctx: &mut SearchContext<'_>,
    game_state: &mut GameState,
    mut depth: i32,
    mut alpha: i32,
    beta: i32,
    ply: usize,
    mut extensions: u8,
) -> Option<i32> {
    ctx.pv.clear_ply(ply);
    if depth <= 0 {
        return quiescence(ctx, game_state, alpha, beta, ply);
    }
    ctx.enter_node()?;

    if !has_legal_moves(game_state) {
        return Some(terminal_score(game_state, ply));
    }
    if let Some(score) = draw_score(game_state) {
        return Some(score);
    }
    if ply >= MAX_PLY {
        return Some(ctx.scorer.score(game_state));
    }

    let key = game_state.zobrist_key;
    if let Some(score) = ctx
        .table
        .lookup_position(key, depth as u8, alpha, beta)
    {
        return Some(score);
    }

    let mut list = MoveList::new();
    generate_legal_moves(game_state, &mut list);
    let in_check = game_state.is_in_check();

    let forcing = (in_check && list.len() <= 2) || has_trapped_queen(game_state);
    if forcing && extensions < EXTENSION_LIMIT {
        depth += 1;
        extensions += 1;
    }

    let hash_move = ctx.table.best_move(key);
    order_moves(game_state, &mut list, hash_move, ctx.killers.killers_at(ply));

    let original_alpha = alpha;
    let mut best_move = None;

    for (index, mv) in list.iter().enumerate() {
        let reduce = if depth >= 3
            && index >= LMR_LIMIT
            && !in_check
            && !is_interesting(game_state, mv)
        {
            reduction(depth, index)
        } else {
            0
        };

        make_move_in_place(game_state, mv);
        let score = search_child(ctx, game_state, depth, reduce, alpha, beta, ply, extensions);
        unmake_move_in_place(game_state);
        let score = score?;

        if score >= beta {
            ctx.table
                .record_position(key, depth as u8, beta, Bound::Lower, Some(mv));
            if !move_is_capture(mv) && !move_is_promotion(mv) {
                ctx.killers.record(ply, mv);
            }
            return Some(beta);
        }
        if score > alpha {
            alpha = score;
            best_move = Some(mv);
            ctx.pv.update(ply, mv);
        }
    }

    if alpha > original_alpha {
        ctx.table
            .record_position(key, depth as u8, alpha, Bound::Exact, best_move);
    } else {
        ctx.table
            .record_position(key, depth as u8, alpha, Bound::Upper, None);
    }
    Some(alpha)
}

/// Search the position after a move, first at `reduce` plies less when
/// asked, repeating at full depth if the reduced result beats alpha.
#[allow(clippy::too_many_arguments)]
fn search_child(
    ctx: &mut SearchContext<'_>,
    game_state: &mut GameState,
    depth: i32,
    reduce: i32,
    alpha: i32,
    beta: i32,
    ply: usize,
    extensions: u8,
) -> Option<i32> {
    if reduce > 0 {
        let reduced_depth = (depth - 1 - reduce).max(0);
        let score = -alpha_beta(ctx, game_state, reduced_depth, -beta, -alpha, ply + 1, extensions)?;
        if score <= alpha {
            return Some(score);
        }
    }
    Some(-alpha_beta(ctx, game_state, depth - 1, -beta, -alpha, ply + 1, extensions)?)
}

/// Root move `index` of `order`, searched from the side to move's view.
pub(crate) fn search_root_move(
    ctx: &mut SearchContext<'_>,
    game_state: &mut GameState,
    mv: Move,
    index: usize,
    depth: i32,
    alpha: i32,
    beta: i32,
) -> Option<i32> {
    let reduce = if depth >= 3
        && index >= LMR_LIMIT
        && !game_state.is_in_check()
        && !is_interesting(game_state, mv)
    {
        root_reduction(depth, index)
    } else {
        0
    };

    make_move_in_place(game_state, mv);
    let score = search_child(ctx, game_state, depth, reduce, alpha, beta, 0, 0);
    unmake_move_in_place(game_state);
    score
}

/// One full pass over the root moves. Returns the best move that raised
/// alpha (if any) and the fail-hard score.
fn root_search(
    ctx: &mut SearchContext<'_>,
    game_state: &mut GameState,
    order: &mut RootMoveOrder,
    depth: i32,
    mut alpha: i32,
    beta: i32,
) -> Option<(Option<Move>, i32)> {
    ctx.pv.clear_ply(0);
    let mut best_move = None;

    for index in 0..order.len() {
        let Some(mv) = order.get(index) else {
            break;
        };
        let started = Instant::now();
        let score = search_root_move(ctx, game_state, mv, index, depth, alpha, beta);
        order.record_time(index, started.elapsed());
        let score = score?;

        if score > alpha {
            alpha = score;
            best_move = Some(mv);
            ctx.pv.update(0, mv);
        }
        if alpha >= beta {
            break;
        }
    }

    let key = game_state.zobrist_key;
    match best_move {
        Some(mv) if alpha < beta => {
            ctx.table
                .record_position(key, depth as u8, alpha, Bound::Exact, Some(mv));
        }
        Some(mv) => {
            ctx.table
                .record_position(key, depth as u8, beta, Bound::Lower, Some(mv));
        }
        None => {}
    }
    Some((best_move, alpha))
}

/// Window half-width for the `attempt`-th try at a depth.
#[inline]
pub(crate) fn aspiration_window(previous: i32, attempt: u32) -> (i32, i32) {
    let margin = VALUE_WINDOW << attempt.min(16);
    if is_mate_score(previous) || margin >= VALUE_MATE {
        return (-VALUE_INF, VALUE_INF);
    }
    (
        (previous - margin).max(-VALUE_INF),
        (previous + margin).min(VALUE_INF),
    )
}

fn search_with_aspiration(
    ctx: &mut SearchContext<'_>,
    game_state: &mut GameState,
    order: &mut RootMoveOrder,
    depth: u8,
    previous: i32,
) -> Option<(Move, i32)> {
    let mut attempt = 0u32;
    let mut window = if depth <= 1 {
        (-VALUE_INF, VALUE_INF)
    } else {
        aspiration_window(previous, attempt)
    };

    loop {
        let (alpha, beta) = window;
        let (best_move, score) = root_search(ctx, game_state, order, i32::from(depth), alpha, beta)?;
        let full_window = alpha <= -VALUE_INF && beta >= VALUE_INF;
        if let Some(mv) = best_move.filter(|_| (score > alpha && score < beta) || full_window) {
            return Some((mv, score));
        }

        attempt += 1;
        window = if is_mate_score(score) {
            (-VALUE_INF, VALUE_INF)
        } else {
            aspiration_window(score, attempt)
        };
        debug!(depth, attempt, score, alpha, beta, "aspiration re-search");
    }
}

/// Best move and score for `game_state`, searched to `max_depth` or until
/// `time_budget_secs` runs out. A position without legal moves yields
/// `NULL_MOVE` and its terminal score.
pub fn search(game_state: &GameState, max_depth: u8, time_budget_secs: Option<f64>) -> (Move, i32) {
    let config = SearchConfig {
        max_depth,
        time_budget: time_budget_secs
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        ..SearchConfig::default()
    };
    match iterative_deepening_search(game_state, &config, &MaterialScorer) {
        Ok(result) => (result.best_move, result.score),
        Err(SearchError::NoLegalMoves) => (NULL_MOVE, terminal_score(game_state, 0)),
    }
}

pub fn iterative_deepening_search(
    game_state: &GameState,
    config: &SearchConfig,
    scorer: &dyn BoardScorer,
) -> Result<SearchResult, SearchError> {
    let mut root_moves = MoveList::new();
    generate_legal_moves(game_state, &mut root_moves);
    if root_moves.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }

    let threads = config.threading.normalized_threads();
    let table = SharedTranspositionTable::new_with_mb(config.hash_mb, threads);
    if threads > 1 {
        return Ok(lazy_smp_search(game_state, &root_moves, config, scorer, &table, threads));
    }

    let started = Instant::now();
    let deadline = config.time_budget.map(|budget| started + budget);
    let stop = AtomicBool::new(false);
    let mut ctx = SearchContext::new(
        deadline,
        &stop,
        config.stop_flag.as_deref(),
        &table,
        scorer,
    );

    let mut state = game_state.clone();
    order_moves(&state, &mut root_moves, None, [NULL_MOVE; 2]);
    let mut order = RootMoveOrder::new(&root_moves);
    let first = order.get(0).unwrap_or(NULL_MOVE);
    let mut result = SearchResult {
        best_move: first,
        score: scorer.score(&state),
        depth: 0,
        principal_variation: vec![first],
        nodes: 0,
        elapsed: Duration::ZERO,
        tt_stats: TTStats::default(),
    };

    for depth in 1..=config.max_depth.min(MAX_DEPTH) {
        if ctx.stopped() {
            break;
        }
        let Some((best_move, score)) =
            search_with_aspiration(&mut ctx, &mut state, &mut order, depth, result.score)
        else {
            break;
        };

        result.best_move = best_move;
        result.score = score;
        result.depth = depth;
        result.principal_variation = ctx.pv.root_line();
        if result.principal_variation.is_empty() {
            result.principal_variation.push(best_move);
        }
        info!(
            depth,
            score,
            nodes = ctx.nodes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            pv = %line_to_san(game_state, &result.principal_variation),
            "search depth complete"
        );

        order.sort(Some(best_move));
        if is_mate_score(score) {
            break;
        }
    }

    result.nodes = ctx.nodes;
    result.elapsed = started.elapsed();
    result.tt_stats = table.stats();
    Ok(result)
}
