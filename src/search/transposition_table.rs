//! Fixed-size transposition table keyed by Zobrist hash.
//!
//! Every index owns two slots. The depth-preferred slot is only overwritten
//! by a search of equal or greater depth (or when empty); the always-replace
//! slot takes every store. Lookups try the depth-preferred slot first. A slot
//! only answers for the exact 64-bit key it was written with; index
//! collisions between distinct keys simply miss.

use tracing::debug;

use crate::game_state::chess_types::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Score is at least this value (search failed high).
    Lower,
    /// Score is at most this value (search failed low).
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub depth: u8,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    depth_preferred: Vec<Option<TTEntry>>,
    always_replace: Vec<Option<TTEntry>>,
    stats: TTStats,
}

impl TranspositionTable {
    pub fn new_with_mb(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let slot_pair = 2 * std::mem::size_of::<Option<TTEntry>>();
        let table = Self::with_entries((bytes / slot_pair).max(1));
        debug!(size_mb, entries = table.len(), "transposition table allocated");
        table
    }

    pub fn with_entries(count: usize) -> Self {
        let count = count.max(1);
        Self {
            depth_preferred: vec![None; count],
            always_replace: vec![None; count],
            stats: TTStats::default(),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.depth_preferred.fill(None);
        self.always_replace.fill(None);
        self.stats = TTStats::default();
    }

    /// Number of indices (each holding two slots).
    #[inline]
    pub fn len(&self) -> usize {
        self.depth_preferred.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depth_preferred.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    #[inline]
    fn idx(&self, key: u64) -> usize {
        (key % self.depth_preferred.len() as u64) as usize
    }

    pub fn record_position(
        &mut self,
        key: u64,
        depth: u8,
        score: i32,
        bound: Bound,
        best_move: Option<Move>,
    ) {
        self.stats.stores += 1;
        let idx = self.idx(key);
        let entry = TTEntry {
            key,
            depth,
            score,
            bound,
            best_move,
        };

        let replace_deep = match self.depth_preferred[idx] {
            None => true,
            Some(existing) => depth >= existing.depth,
        };
        if replace_deep {
            self.depth_preferred[idx] = Some(entry);
        }
        self.always_replace[idx] = Some(entry);
    }

    /// Raw entry for `key`, depth-preferred slot first.
    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        let idx = self.idx(key);
        self.depth_preferred[idx]
            .filter(|entry| entry.key == key)
            .or_else(|| self.always_replace[idx].filter(|entry| entry.key == key))
    }

    /// A score usable at this node, or `None` when the caller must search.
    ///
    /// Exact entries return their score. A lower bound at or above `beta`
    /// returns `beta`; an upper bound at or below `alpha` returns `alpha`.
    pub fn lookup_position(&mut self, key: u64, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        self.stats.probes += 1;
        let idx = self.idx(key);

        for slot in [self.depth_preferred[idx], self.always_replace[idx]] {
            let Some(entry) = slot.filter(|entry| entry.key == key) else {
                continue;
            };
            if entry.depth < depth {
                continue;
            }
            let usable = match entry.bound {
                Bound::Exact => Some(entry.score),
                Bound::Lower if entry.score >= beta => Some(beta),
                Bound::Upper if entry.score <= alpha => Some(alpha),
                _ => None,
            };
            if usable.is_some() {
                self.stats.hits += 1;
                return usable;
            }
        }

        None
    }

    /// Best move stored for `key`, used to order the hash move first.
    pub fn best_move(&self, key: u64) -> Option<Move> {
        let idx = self.idx(key);
        [self.depth_preferred[idx], self.always_replace[idx]]
            .into_iter()
            .flatten()
            .filter(|entry| entry.key == key)
            .find_map(|entry| entry.best_move)
    }

    /// Filled share of the first thousand depth-preferred slots, in permille.
    pub fn hashfull_permille(&self) -> u32 {
        let sample = self.depth_preferred.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let used = self.depth_preferred[..sample]
            .iter()
            .filter(|slot| slot.is_some())
            .count();
        (used * 1000 / sample) as u32
    }
}
