//! Multi-worker root search and the structures the workers share.
//!
//! Workers each own a copy of the root position plus private killers and
//! PV, and claim root moves one at a time from an atomic cursor. The
//! current window, best move and beta-cut flag live in a mutex-guarded
//! record. The transposition table is sharded behind mutexes; concurrent
//! writers may overwrite each other, which the table tolerates as a cache.
//! Root-move assignment is racy, so multi-worker results are not
//! reproducible run to run.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::game_state::{chess_types::Move, game_state::GameState};
use crate::moves::move_descriptions::{MoveList, NULL_MOVE};
use crate::search::board_scoring::BoardScorer;
use crate::search::iterative_deepening::{
    aspiration_window, is_mate_score, search_root_move, SearchConfig, SearchContext,
    SearchResult, MAX_DEPTH, VALUE_INF,
};
use crate::search::move_ordering::{order_moves, RootMoveOrder};
use crate::search::transposition_table::{Bound, TTEntry, TTStats, TranspositionTable};
use crate::utils::san::line_to_san;

pub const MAX_THREADS: usize = 12;

/// Search execution model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadingModel {
    SingleThreaded,
    /// Root moves split over workers sharing the table and stop flag.
    LazySmp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadingConfig {
    pub model: ThreadingModel,
    pub requested_threads: usize,
}

impl Default for ThreadingConfig {
    fn default() -> Self {
        Self {
            model: ThreadingModel::SingleThreaded,
            requested_threads: 1,
        }
    }
}

impl ThreadingConfig {
    pub fn with_threads(requested_threads: usize) -> Self {
        let model = if requested_threads > 1 {
            ThreadingModel::LazySmp
        } else {
            ThreadingModel::SingleThreaded
        };
        Self {
            model,
            requested_threads,
        }
    }

    /// Worker count actually used, within `1..=MAX_THREADS`.
    #[inline]
    pub fn normalized_threads(self) -> usize {
        match self.model {
            ThreadingModel::SingleThreaded => 1,
            ThreadingModel::LazySmp => self.requested_threads.clamp(1, MAX_THREADS),
        }
    }
}

/// Transposition table split into independently locked shards.
#[derive(Debug)]
pub struct SharedTranspositionTable {
    shards: Vec<Mutex<TranspositionTable>>,
}

impl SharedTranspositionTable {
    pub fn new_with_mb(total_mb: usize, shard_count: usize) -> Self {
        let shards = shard_count.max(1);
        let mb_per_shard = (total_mb.max(1) / shards).max(1);
        Self {
            shards: (0..shards)
                .map(|_| Mutex::new(TranspositionTable::new_with_mb(mb_per_shard)))
                .collect(),
        }
    }

    /// Shard choice uses high key bits; the slot index inside a shard uses
    /// the key modulo its length.
    #[inline]
    fn shard(&self, key: u64) -> &Mutex<TranspositionTable> {
        &self.shards[((key >> 40) % self.shards.len() as u64) as usize]
    }

    #[inline]
    pub fn record_position(
        &self,
        key: u64,
        depth: u8,
        score: i32,
        bound: Bound,
        best_move: Option<Move>,
    ) {
        self.shard(key)
            .lock()
            .record_position(key, depth, score, bound, best_move);
    }

    #[inline]
    pub fn lookup_position(&self, key: u64, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        self.shard(key).lock().lookup_position(key, depth, alpha, beta)
    }

    #[inline]
    pub fn best_move(&self, key: u64) -> Option<Move> {
        self.shard(key).lock().best_move(key)
    }

    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        self.shard(key).lock().probe(key)
    }

    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> TTStats {
        let mut merged = TTStats::default();
        for shard in &self.shards {
            let stats = shard.lock().stats();
            merged.probes += stats.probes;
            merged.hits += stats.hits;
            merged.stores += stats.stores;
        }
        merged
    }

    pub fn hashfull_permille(&self) -> u32 {
        let total: u32 = self.shards.iter().map(|shard| shard.lock().hashfull_permille()).sum();
        total / self.shards.len() as u32
    }
}

/// Shared state of one parallel pass over the root moves.
#[derive(Debug, Clone)]
pub struct RootRecord {
    pub alpha: i32,
    pub beta: i32,
    pub best_move: Option<Move>,
    pub best_score: i32,
    pub beta_cut: bool,
    pub principal_variation: Vec<Move>,
    timings: Vec<Duration>,
}

#[derive(Debug)]
pub struct RootCoordinator {
    record: Mutex<RootRecord>,
    cursor: AtomicUsize,
    root_moves: usize,
}

impl RootCoordinator {
    pub fn new(alpha: i32, beta: i32, root_moves: usize) -> Self {
        Self {
            record: Mutex::new(RootRecord {
                alpha,
                beta,
                best_move: None,
                best_score: alpha,
                beta_cut: false,
                principal_variation: Vec::new(),
                timings: vec![Duration::ZERO; root_moves],
            }),
            cursor: AtomicUsize::new(0),
            root_moves,
        }
    }

    /// Index of the next unexplored root move, `None` once all are claimed
    /// or a beta cutoff has been found.
    pub fn claim_next(&self) -> Option<usize> {
        if self.record.lock().beta_cut {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        (index < self.root_moves).then_some(index)
    }

    /// Current search window.
    pub fn window(&self) -> (i32, i32) {
        let record = self.record.lock();
        (record.alpha, record.beta)
    }

    /// Publish a finished root move. Returns true when it produced a beta
    /// cutoff.
    pub fn report(
        &self,
        index: usize,
        mv: Move,
        score: i32,
        elapsed: Duration,
        continuation: &[Move],
    ) -> bool {
        let mut record = self.record.lock();
        if let Some(slot) = record.timings.get_mut(index) {
            *slot = elapsed;
        }
        if score > record.alpha && !record.beta_cut {
            record.alpha = score;
            record.best_score = score;
            record.best_move = Some(mv);
            record.principal_variation.clear();
            record.principal_variation.push(mv);
            record.principal_variation.extend_from_slice(continuation);
            if score >= record.beta {
                record.beta_cut = true;
            }
        }
        record.beta_cut
    }

    pub fn snapshot(&self) -> RootRecord {
        self.record.lock().clone()
    }
}

/// One parallel pass: `None` if the search was stopped before every
/// claimed move finished.
fn parallel_root_pass(
    contexts: &mut [SearchContext<'_>],
    game_state: &GameState,
    order: &mut RootMoveOrder,
    depth: u8,
    alpha: i32,
    beta: i32,
) -> Option<RootRecord> {
    let coordinator = RootCoordinator::new(alpha, beta, order.len());
    let interrupted = AtomicBool::new(false);

    thread::scope(|scope| {
        for (worker, ctx) in contexts.iter_mut().enumerate() {
            let coordinator = &coordinator;
            let interrupted = &interrupted;
            let order = &*order;
            scope.spawn(move || {
                debug!(worker, depth, "root worker started");
                let mut state = game_state.clone();
                let mut searched = 0usize;
                while let Some(index) = coordinator.claim_next() {
                    let Some(mv) = order.get(index) else {
                        break;
                    };
                    let (alpha, beta) = coordinator.window();
                    let started = Instant::now();
                    let Some(score) =
                        search_root_move(ctx, &mut state, mv, index, i32::from(depth), alpha, beta)
                    else {
                        interrupted.store(true, Ordering::Relaxed);
                        break;
                    };
                    searched += 1;
                    if coordinator.report(index, mv, score, started.elapsed(), &ctx.pv.line_from(1)) {
                        break;
                    }
                }
                debug!(worker, depth, searched, nodes = ctx.nodes, "root worker finished");
            });
        }
    });

    if interrupted.load(Ordering::Relaxed) {
        return None;
    }
    let record = coordinator.snapshot();
    for (index, elapsed) in record.timings.iter().enumerate() {
        order.record_time(index, *elapsed);
    }
    Some(record)
}

/// Iterative deepening with each depth's root moves spread over `threads`
/// scoped workers.
pub(crate) fn lazy_smp_search(
    game_state: &GameState,
    root_moves: &MoveList,
    config: &SearchConfig,
    scorer: &dyn BoardScorer,
    table: &SharedTranspositionTable,
    threads: usize,
) -> SearchResult {
    let started = Instant::now();
    let deadline = config.time_budget.map(|budget| started + budget);
    let stop = AtomicBool::new(false);
    let external = config.stop_flag.as_deref();
    let mut contexts: Vec<SearchContext<'_>> = (0..threads)
        .map(|_| SearchContext::new(deadline, &stop, external, table, scorer))
        .collect();

    let mut ordered = root_moves.clone();
    order_moves(game_state, &mut ordered, None, [NULL_MOVE; 2]);
    let mut order = RootMoveOrder::new(&ordered);
    let first = order.get(0).unwrap_or(NULL_MOVE);
    let mut result = SearchResult {
        best_move: first,
        score: scorer.score(game_state),
        depth: 0,
        principal_variation: vec![first],
        nodes: 0,
        elapsed: Duration::ZERO,
        tt_stats: TTStats::default(),
    };
    debug!(threads, "lazy SMP search started");

    'deepening: for depth in 1..=config.max_depth.min(MAX_DEPTH) {
        if contexts.iter().any(|ctx| ctx.stopped()) {
            break;
        }

        let mut attempt = 0u32;
        let mut window = if depth <= 1 {
            (-VALUE_INF, VALUE_INF)
        } else {
            aspiration_window(result.score, attempt)
        };
        let record = loop {
            let (alpha, beta) = window;
            let Some(record) = parallel_root_pass(&mut contexts, game_state, &mut order, depth, alpha, beta)
            else {
                break 'deepening;
            };
            let full_window = alpha <= -VALUE_INF && beta >= VALUE_INF;
            let inside = record.best_score > alpha && record.best_score < beta;
            if record.best_move.is_some() && (inside || full_window) {
                break record;
            }
            attempt += 1;
            window = if is_mate_score(record.best_score) {
                (-VALUE_INF, VALUE_INF)
            } else {
                aspiration_window(record.best_score, attempt)
            };
            debug!(depth, attempt, score = record.best_score, alpha, beta, "aspiration re-search");
        };

        let Some(best_move) = record.best_move else {
            break;
        };
        result.best_move = best_move;
        result.score = record.best_score;
        result.depth = depth;
        result.principal_variation = record.principal_variation;
        let nodes: u64 = contexts.iter().map(|ctx| ctx.nodes).sum();
        info!(
            depth,
            score = result.score,
            nodes,
            threads,
            elapsed_ms = started.elapsed().as_millis() as u64,
            pv = %line_to_san(game_state, &result.principal_variation),
            "search depth complete"
        );

        order.sort(Some(best_move));
        if is_mate_score(result.score) {
            break;
        }
    }

    result.nodes = contexts.iter().map(|ctx| ctx.nodes).sum();
    result.elapsed = started.elapsed();
    result.tt_stats = table.stats();
    result
}
