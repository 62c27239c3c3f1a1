use crate::game_state::chess_types::*;

/// Single undo record for `make_move_in_place` / `unmake_move_in_place`.
///
/// The move itself carries the moved and captured piece codes, so only the
/// irreversible parts of the position are stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoState {
    pub mv: Move,
    pub prev_castling_rights: CastlingRights,
    pub prev_en_passant_square: Option<Square>,
    pub prev_halfmove_clock: u16,
    pub prev_fullmove_number: u16,
    pub prev_zobrist_key: u64,
}
