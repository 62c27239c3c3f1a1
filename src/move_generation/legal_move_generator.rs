//! Full legal move generation pipeline.
//!
//! Moves are produced legal by construction: the check mask restricts
//! destinations while in check, pins restrict pinned pieces to their ray, and
//! king steps avoid every enemy-attacked square. Each emitted move carries its
//! gives-check bit.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_checks::{CheckInfo, CheckSquares};
use crate::move_generation::legal_moves_king::generate_king_moves;
use crate::move_generation::legal_moves_pawn::generate_pawn_moves;
use crate::move_generation::legal_moves_pieces::generate_piece_moves;
use crate::moves::move_descriptions::{
    move_identity, pack_move, with_gives_check, MoveClass, MoveList,
};

/// Which moves a generation pass emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    All,
    /// Captures (en passant included) and every promotion.
    Tactical,
}

/// State shared by the per-piece generators during one call.
pub(crate) struct Generation<'a> {
    pub state: &'a GameState,
    pub info: CheckInfo,
    pub checks: Option<CheckSquares>,
    pub mode: GenerationMode,
}

impl<'a> Generation<'a> {
    pub fn new(state: &'a GameState, mode: GenerationMode, annotate_checks: bool) -> Self {
        Self {
            state,
            info: CheckInfo::new(state),
            checks: annotate_checks.then(|| CheckSquares::new(state)),
            mode,
        }
    }

    /// Destinations for non-king pieces: legal under the check mask, not
    /// friendly-occupied, and enemy-occupied only in tactical mode.
    #[inline]
    pub fn piece_targets(&self) -> u64 {
        let own = self.state.occupancy_by_color[self.info.us.index()];
        let mut targets = !own & self.info.check_mask;
        if self.mode == GenerationMode::Tactical {
            targets &= self.state.occupancy_by_color[self.info.them.index()];
        }
        targets
    }

    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn emit(
        &self,
        list: &mut MoveList,
        from: Square,
        to: Square,
        moved: PieceKind,
        captured: Option<PieceKind>,
        promotion: Option<PieceKind>,
        class: MoveClass,
    ) {
        let mv = pack_move(from, to, moved, captured, promotion, class, self.info.us);
        let mv = match &self.checks {
            Some(checks) if checks.gives_check(self.state, mv, class) => with_gives_check(mv),
            _ => mv,
        };
        list.push(mv);
    }

    /// Emit a normal move or capture, reading the captured piece off the board.
    #[inline]
    pub fn emit_simple(&self, list: &mut MoveList, from: Square, to: Square, moved: PieceKind) {
        let captured = self.state.piece_on(to).map(|(_, kind)| kind);
        let class = if captured.is_some() {
            MoveClass::Capture
        } else {
            MoveClass::Quiet
        };
        self.emit(list, from, to, moved, captured, None, class);
    }
}

fn generate_into(generation: &Generation<'_>, list: &mut MoveList) {
    generate_king_moves(generation, list);
    if generation.info.in_double_check() {
        return;
    }
    generate_pawn_moves(generation, list);
    generate_piece_moves(generation, list);
}

/// All legal moves for the side to move, each annotated with gives-check.
pub fn generate_legal_moves(game_state: &GameState, list: &mut MoveList) {
    list.clear();
    let generation = Generation::new(game_state, GenerationMode::All, true);
    generate_into(&generation, list);
}

/// Legal captures and promotions only.
pub fn generate_legal_captures(game_state: &GameState, list: &mut MoveList) {
    list.clear();
    let generation = Generation::new(game_state, GenerationMode::Tactical, true);
    generate_into(&generation, list);
}

/// Legal moves without gives-check annotation (perft leaves, existence checks).
pub fn generate_legal_moves_unannotated(game_state: &GameState, list: &mut MoveList) {
    list.clear();
    let generation = Generation::new(game_state, GenerationMode::All, false);
    generate_into(&generation, list);
}

/// Does the side to move have any legal move. Stops after the first piece
/// group that yields one.
pub fn has_legal_moves(game_state: &GameState) -> bool {
    let generation = Generation::new(game_state, GenerationMode::All, false);
    let mut list = MoveList::new();

    generate_king_moves(&generation, &mut list);
    if !list.is_empty() || generation.info.in_double_check() {
        return !list.is_empty();
    }
    generate_piece_moves(&generation, &mut list);
    if !list.is_empty() {
        return true;
    }
    generate_pawn_moves(&generation, &mut list);
    !list.is_empty()
}

/// Is `mv` one of the legal moves here, compared by origin, destination and
/// promotion piece.
pub fn is_legal_move(game_state: &GameState, mv: Move) -> bool {
    find_legal_move(game_state, mv).is_some()
}

/// The generator's own encoding of `mv`, if legal.
pub fn find_legal_move(game_state: &GameState, mv: Move) -> Option<Move> {
    let mut list = MoveList::new();
    generate_legal_moves(game_state, &mut list);
    let wanted = move_identity(mv);
    list.iter().find(|&candidate| move_identity(candidate) == wanted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    /// Fifty-move rule, threefold repetition or insufficient material.
    Draw,
}

pub fn game_status(game_state: &GameState) -> GameStatus {
    if !has_legal_moves(game_state) {
        return if game_state.is_in_check() {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }

    if game_state.is_fifty_move_draw()
        || game_state.is_threefold_repetition()
        || game_state.is_insufficient_material()
    {
        return GameStatus::Draw;
    }

    GameStatus::Ongoing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::move_descriptions::{
        move_class, move_gives_check, move_is_capture, move_moved_piece, move_to,
    };

    fn legal(fen: &str) -> MoveList {
        let game = GameState::from_fen(fen).expect("FEN should parse");
        let mut list = MoveList::new();
        generate_legal_moves(&game, &mut list);
        list
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let game = GameState::new_game();
        let mut list = MoveList::new();
        generate_legal_moves(&game, &mut list);
        assert_eq!(list.len(), 20);
        assert!(has_legal_moves(&game));
        assert_eq!(game_status(&game), GameStatus::Ongoing);
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        // Rook on e8 and bishop on b4 both check the king on e1.
        let list = legal("4r1k1/8/8/8/1b6/8/8/1N2K3 w - - 0 1");
        // Nc3 and Nd2 would block the bishop but must not be offered.
        assert!(list.iter().all(|mv| move_moved_piece(mv) == PieceKind::King));
        assert!(!list.is_empty());
    }

    #[test]
    fn castling_through_attacked_square_is_illegal() {
        // Dark rook on f8 covers f1.
        let list = legal("5rk1/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(list.iter().all(|mv| move_class(mv) != MoveClass::Castle));

        let list = legal("6k1/8/8/8/8/8/8/4K2R w K - 0 1");
        assert_eq!(
            list.iter().filter(|&mv| move_class(mv) == MoveClass::Castle).count(),
            1
        );
    }

    #[test]
    fn queenside_castle_allowed_when_only_b_file_is_attacked() {
        let list = legal("1r4k1/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert_eq!(
            list.iter().filter(|&mv| move_class(mv) == MoveClass::Castle).count(),
            1
        );
    }

    #[test]
    fn en_passant_exposing_king_on_rank_is_not_offered() {
        let list = legal("8/8/8/KPp4r/8/8/8/6k1 w - c6 0 1");
        assert!(list.iter().all(|mv| move_to(mv) != 42));

        let list = legal("8/8/8/1Pp4r/8/K7/8/6k1 w - c6 0 1");
        assert!(list.iter().any(|mv| move_to(mv) == 42 && move_is_capture(mv)));
    }

    #[test]
    fn checkmate_and_stalemate_are_classified() {
        let mate = GameState::from_fen("6k1/5ppp/8/8/8/8/8/3R2K1 w - - 0 1")
            .expect("FEN should parse");
        let mut list = MoveList::new();
        generate_legal_moves(&mate, &mut list);
        let mating = list
            .iter()
            .find(|&mv| move_to(mv) == 59)
            .expect("Rd8 should be generated");
        assert!(move_gives_check(mating));

        let mated = GameState::from_fen("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 1 1")
            .expect("FEN should parse");
        assert_eq!(game_status(&mated), GameStatus::Checkmate);

        let stalemate =
            GameState::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert_eq!(game_status(&stalemate), GameStatus::Stalemate);
        assert!(!has_legal_moves(&stalemate));
    }

    #[test]
    fn captures_only_mode_returns_captures_and_promotions() {
        let game = GameState::from_fen("4k3/1P6/8/8/8/8/3n4/R3K1Nr w Q - 0 1")
            .expect("FEN should parse");
        let mut list = MoveList::new();
        generate_legal_captures(&game, &mut list);
        assert!(!list.is_empty());
        assert!(list
            .iter()
            .all(|mv| move_is_capture(mv) || move_class(mv) == MoveClass::Promotion));
        // Four b8 promotions plus Kxd2; the g1 knight is pinned by the h1 rook.
        assert_eq!(list.len(), 5);
        assert_eq!(
            list.iter()
                .filter(|&mv| move_class(mv) == MoveClass::Promotion)
                .count(),
            4
        );
    }

    #[test]
    fn is_legal_move_matches_by_identity() {
        let game = GameState::new_game();
        let e2e4 = pack_move(12, 28, PieceKind::Pawn, None, None, MoveClass::Quiet, Color::Light);
        assert!(is_legal_move(&game, e2e4));
        let e2e5 = pack_move(12, 36, PieceKind::Pawn, None, None, MoveClass::Quiet, Color::Light);
        assert!(!is_legal_move(&game, e2e5));
    }
}
