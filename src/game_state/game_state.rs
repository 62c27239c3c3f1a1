//! Core incremental board state representation.
//!
//! `GameState` keeps an 8x8 mailbox and per-color, per-kind bitboards side by
//! side. Every placement change goes through `put_piece`, `remove_piece` or
//! `move_piece`, which update the mailbox, both bitboard sets and the Zobrist
//! key together, so no caller can observe the two views out of sync.

use crate::errors::FenError;
use crate::game_state::chess_rules::{FIFTY_MOVE_RULE_PLIES, LIGHT_SQUARES, STARTING_POSITION_FEN};
use crate::game_state::chess_types::*;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::search::zobrist::{compute_zobrist_key, piece_square_key};
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

/// Undo records reserved up front so searches never reallocate mid-tree.
const UNDO_STACK_CAPACITY: usize = 256;

/// Incremental game state optimized for fast move making/unmaking.
#[derive(Debug, Clone)]
pub struct GameState {
    // --- Mailbox representation ---
    pub board: [Option<Piece>; 64],

    // --- Bitboard representation ---
    // [color][piece_kind]
    pub pieces: [[u64; 6]; 2],

    // Occupancy caches.
    pub occupancy_by_color: [u64; 2],
    pub occupancy_all: u64,

    // --- Side and state flags ---
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,

    // --- Clocks / move counters ---
    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    // --- Incremental hashing ---
    pub zobrist_key: u64,

    // --- Search / repetition support ---
    pub ply: u16,
    /// Key of every position reached, current position last.
    pub repetition_history: Vec<u64>,

    // --- Make/unmake stack ---
    pub undo_stack: Vec<UndoState>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            board: [None; 64],
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,

            side_to_move: Color::Light,
            castling_rights: 0,
            en_passant_square: None,

            halfmove_clock: 0,
            fullmove_number: 1,

            zobrist_key: 0,

            ply: 0,
            repetition_history: Vec::with_capacity(UNDO_STACK_CAPACITY),
            undo_stack: Vec::with_capacity(UNDO_STACK_CAPACITY),
        }
    }
}

impl GameState {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn new_game() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        parse_fen(fen)
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    // --- Placement primitives ---

    /// Place a piece on an empty square.
    #[inline]
    pub(crate) fn put_piece(&mut self, color: Color, kind: PieceKind, square: Square) {
        let bit = square_bit(square);
        self.board[square as usize] = Some((color, kind));
        self.pieces[color.index()][kind.index()] |= bit;
        self.occupancy_by_color[color.index()] |= bit;
        self.occupancy_all |= bit;
        self.zobrist_key ^= piece_square_key(color, kind, square);
    }

    /// Clear a square, returning what stood there.
    #[inline]
    pub(crate) fn remove_piece(&mut self, square: Square) -> Option<Piece> {
        let (color, kind) = self.board[square as usize].take()?;
        let bit = square_bit(square);
        self.pieces[color.index()][kind.index()] &= !bit;
        self.occupancy_by_color[color.index()] &= !bit;
        self.occupancy_all &= !bit;
        self.zobrist_key ^= piece_square_key(color, kind, square);
        Some((color, kind))
    }

    /// Relocate a piece to an empty square.
    #[inline]
    pub(crate) fn move_piece(&mut self, from: Square, to: Square) {
        if let Some((color, kind)) = self.remove_piece(from) {
            self.put_piece(color, kind, to);
        }
    }

    // --- Queries ---

    #[inline]
    pub fn piece_on(&self, square: Square) -> Option<Piece> {
        self.board[square as usize]
    }

    #[inline]
    pub fn pieces_of(&self, color: Color, kind: PieceKind) -> u64 {
        self.pieces[color.index()][kind.index()]
    }

    #[inline]
    pub fn all_occupied(&self) -> u64 {
        self.occupancy_all
    }

    /// Square of `color`'s king, `None` only for hand-built boards without one.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.pieces_of(color, PieceKind::King);
        (kings != 0).then(|| kings.trailing_zeros() as Square)
    }

    /// Number of pieces of `kind` for both colors.
    #[inline]
    pub fn piece_count(&self, kind: PieceKind) -> u32 {
        self.piece_count_for(Color::Light, kind) + self.piece_count_for(Color::Dark, kind)
    }

    #[inline]
    pub fn piece_count_for(&self, color: Color, kind: PieceKind) -> u32 {
        self.pieces_of(color, kind).count_ones()
    }

    /// Is the side to move in check.
    pub fn is_in_check(&self) -> bool {
        self.is_color_in_check(self.side_to_move)
    }

    pub fn is_color_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => is_square_attacked(self, king, color.opposite(), self.occupancy_all),
            None => false,
        }
    }

    // --- Draw predicates ---

    #[inline]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_RULE_PLIES
    }

    /// The current key already occurred at least twice within the reversible
    /// stretch of the game (same side to move, so every second ply).
    pub fn is_threefold_repetition(&self) -> bool {
        let Some((&current, earlier)) = self.repetition_history.split_last() else {
            return false;
        };

        let window = (self.halfmove_clock as usize).min(earlier.len());
        let mut seen = 0;
        let mut back = 2usize;
        while back <= window {
            if earlier[earlier.len() - back] == current {
                seen += 1;
                if seen >= 2 {
                    return true;
                }
            }
            back += 2;
        }
        false
    }

    /// Positions no sequence of legal moves can checkmate: K v K, K+minor v K,
    /// K+N+N v K and K+B v K+B with bishops on the same square color.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy_or_pawn = [PieceKind::Pawn, PieceKind::Rook, PieceKind::Queen]
            .iter()
            .any(|&kind| self.piece_count(kind) != 0);
        if heavy_or_pawn {
            return false;
        }

        let light = Color::Light;
        let dark = Color::Dark;
        let knights = [
            self.piece_count_for(light, PieceKind::Knight),
            self.piece_count_for(dark, PieceKind::Knight),
        ];
        let bishops = [
            self.piece_count_for(light, PieceKind::Bishop),
            self.piece_count_for(dark, PieceKind::Bishop),
        ];
        let minors = [knights[0] + bishops[0], knights[1] + bishops[1]];

        match (minors[0], minors[1]) {
            (0, 0) | (1, 0) | (0, 1) => true,
            (2, 0) => knights[0] == 2,
            (0, 2) => knights[1] == 2,
            (1, 1) if bishops[0] == 1 && bishops[1] == 1 => {
                let all_bishops = self.pieces_of(light, PieceKind::Bishop)
                    | self.pieces_of(dark, PieceKind::Bishop);
                let on_light = (all_bishops & LIGHT_SQUARES).count_ones();
                on_light == 0 || on_light == 2
            }
            _ => false,
        }
    }

    /// Check the mailbox against the bitboards, the occupancy unions and the
    /// incremental key against a from-scratch recomputation.
    pub fn validate_consistency(&self) -> Result<(), String> {
        for square in 0..64u8 {
            let bit = square_bit(square);
            let mut holders = Vec::new();
            for color in [Color::Light, Color::Dark] {
                for kind in ALL_PIECE_KINDS {
                    if self.pieces_of(color, kind) & bit != 0 {
                        holders.push((color, kind));
                    }
                }
            }

            match (self.board[square as usize], holders.as_slice()) {
                (None, []) => {}
                (Some(piece), [held]) if piece == *held => {}
                (board, bits) => {
                    return Err(format!(
                        "square {square}: mailbox {board:?} disagrees with bitboards {bits:?}"
                    ));
                }
            }
        }

        for color in [Color::Light, Color::Dark] {
            let union = self.pieces[color.index()].iter().fold(0u64, |acc, bb| acc | bb);
            if union != self.occupancy_by_color[color.index()] {
                return Err(format!("{color:?} occupancy cache is stale"));
            }
        }

        if self.occupancy_all != self.occupancy_by_color[0] | self.occupancy_by_color[1] {
            return Err("combined occupancy cache is stale".to_owned());
        }

        let recomputed = compute_zobrist_key(self);
        if recomputed != self.zobrist_key {
            return Err(format!(
                "incremental key {:#018x} differs from recomputed {recomputed:#018x}",
                self.zobrist_key
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_is_consistent() {
        let game = GameState::new_game();
        game.validate_consistency().expect("start position should be consistent");
        assert_eq!(game.piece_count(PieceKind::Pawn), 16);
        assert_eq!(game.piece_count_for(Color::Dark, PieceKind::Knight), 2);
        assert_eq!(game.all_occupied().count_ones(), 32);
        assert_eq!(game.king_square(Color::Light), Some(4));
        assert_eq!(game.piece_on(60), Some((Color::Dark, PieceKind::King)));
        assert!(!game.is_in_check());
    }

    #[test]
    fn primitives_keep_views_and_key_in_sync() {
        let mut game = GameState::new_game();
        let before = game.zobrist_key;

        game.move_piece(1, 18);
        game.validate_consistency().expect("move_piece should stay consistent");
        assert_eq!(game.piece_on(18), Some((Color::Light, PieceKind::Knight)));
        assert_eq!(game.piece_on(1), None);

        game.move_piece(18, 1);
        assert_eq!(game.zobrist_key, before);

        let removed = game.remove_piece(59);
        assert_eq!(removed, Some((Color::Dark, PieceKind::Queen)));
        game.validate_consistency().expect("remove_piece should stay consistent");
        assert_eq!(game.remove_piece(59), None);
    }

    #[test]
    fn detects_check_for_side_to_move() {
        let game = GameState::from_fen("4k3/8/8/8/8/8/8/4K2r w - - 0 1").expect("FEN should parse");
        assert!(game.is_in_check());
        assert!(!game.is_color_in_check(Color::Dark));
    }

    #[test]
    fn fifty_move_rule_triggers_at_one_hundred_plies() {
        let game =
            GameState::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 100 80").expect("FEN should parse");
        assert!(game.is_fifty_move_draw());
        let game =
            GameState::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").expect("FEN should parse");
        assert!(!game.is_fifty_move_draw());
    }

    #[test]
    fn insufficient_material_cases() {
        let cases = [
            ("4k3/8/8/8/8/8/8/4K3 w - - 0 1", true),
            ("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1", true),
            ("4k3/8/8/8/8/8/8/1N2K3 w - - 0 1", true),
            ("4k3/8/8/8/8/8/8/1N2K1N1 w - - 0 1", true),
            ("2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1", false),
            ("3bk3/8/8/8/8/8/8/2B1K3 w - - 0 1", true),
            ("4k3/8/8/8/8/8/8/1B2K1N1 w - - 0 1", false),
            ("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", false),
            ("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", false),
        ];
        for (fen, expected) in cases {
            let game = GameState::from_fen(fen).expect("FEN should parse");
            assert_eq!(game.is_insufficient_material(), expected, "{fen}");
        }
    }

    #[test]
    fn threefold_needs_two_earlier_occurrences() {
        let mut game = GameState::new_game();
        let key = game.zobrist_key;
        game.halfmove_clock = 8;
        game.repetition_history = vec![key, 1, 2, 3, key, 5, 6, 7, key];
        assert!(game.is_threefold_repetition());

        game.repetition_history = vec![key, 1, 2, 3, 4, 5, 6, 7, key];
        assert!(!game.is_threefold_repetition());

        // Occurrences older than the last irreversible move do not count.
        game.halfmove_clock = 4;
        game.repetition_history = vec![key, 1, 2, 3, key, 5, 6, 7, key];
        assert!(!game.is_threefold_repetition());
    }
}
