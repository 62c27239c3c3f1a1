//! Packed move encoding and the fixed-capacity move list.
//!
//! Bit layout of a `Move` (low bits first):
//!
//! | bits  | field                                             |
//! |-------|---------------------------------------------------|
//! | 0-5   | origin square                                     |
//! | 6-11  | destination square                                |
//! | 12-14 | moving piece code (`PieceKind::code`)             |
//! | 15-17 | captured piece code, 0 = none                     |
//! | 18-19 | promotion selector (0 N, 1 B, 2 R, 3 Q)           |
//! | 20-21 | move class (0 quiet, 1 capture, 2 castle, 3 promotion) |
//! | 22    | side bit, 1 = light                               |
//! | 23    | gives check                                       |
//!
//! A promotion capture has class promotion and a non-zero captured field. An
//! en-passant capture is class capture with a captured pawn; the destination
//! is empty on the board, which is how make/unmake tell it apart.

use std::fmt;

use crate::game_state::chess_types::{Color, Move, PieceKind, Square};

const FROM_SHIFT: u32 = 0;
const TO_SHIFT: u32 = 6;
const MOVED_PIECE_SHIFT: u32 = 12;
const CAPTURED_PIECE_SHIFT: u32 = 15;
const PROMOTION_SHIFT: u32 = 18;
const CLASS_SHIFT: u32 = 20;
const SIDE_BIT: Move = 1 << 22;
const GIVES_CHECK_BIT: Move = 1 << 23;

const SQUARE_MASK: Move = 0x3F;
const PIECE_MASK: Move = 0x7;
const TWO_BIT_MASK: Move = 0x3;

pub const NULL_MOVE: Move = 0;

/// Upper bound on legal moves in any reachable position (218) with headroom.
pub const MAX_MOVES: usize = 256;

/// Piece codes outside `1..=6` never occur in generated moves.
const CODE_TO_KIND: [PieceKind; 8] = [
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::King,
];

const SELECTOR_TO_KIND: [PieceKind; 4] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveClass {
    Quiet = 0,
    Capture = 1,
    Castle = 2,
    Promotion = 3,
}

impl MoveClass {
    #[inline]
    const fn from_bits(bits: Move) -> Self {
        match bits & TWO_BIT_MASK {
            0 => MoveClass::Quiet,
            1 => MoveClass::Capture,
            2 => MoveClass::Castle,
            _ => MoveClass::Promotion,
        }
    }
}

#[inline]
const fn promotion_selector(kind: PieceKind) -> Move {
    match kind {
        PieceKind::Bishop => 1,
        PieceKind::Rook => 2,
        PieceKind::Queen => 3,
        _ => 0,
    }
}

/// Pack a move. `promotion` is only meaningful with `MoveClass::Promotion`.
#[inline]
pub fn pack_move(
    from: Square,
    to: Square,
    moved: PieceKind,
    captured: Option<PieceKind>,
    promotion: Option<PieceKind>,
    class: MoveClass,
    side: Color,
) -> Move {
    let mut mv = (from as Move & SQUARE_MASK) << FROM_SHIFT;
    mv |= (to as Move & SQUARE_MASK) << TO_SHIFT;
    mv |= moved.code() << MOVED_PIECE_SHIFT;
    mv |= captured.map_or(0, PieceKind::code) << CAPTURED_PIECE_SHIFT;
    mv |= promotion.map_or(0, promotion_selector) << PROMOTION_SHIFT;
    mv |= (class as Move) << CLASS_SHIFT;
    if side == Color::Light {
        mv |= SIDE_BIT;
    }
    mv
}

#[inline]
pub const fn with_gives_check(mv: Move) -> Move {
    mv | GIVES_CHECK_BIT
}

#[inline]
pub const fn move_from(mv: Move) -> Square {
    ((mv >> FROM_SHIFT) & SQUARE_MASK) as Square
}

#[inline]
pub const fn move_to(mv: Move) -> Square {
    ((mv >> TO_SHIFT) & SQUARE_MASK) as Square
}

#[inline]
pub const fn move_moved_piece(mv: Move) -> PieceKind {
    CODE_TO_KIND[((mv >> MOVED_PIECE_SHIFT) & PIECE_MASK) as usize]
}

#[inline]
pub const fn move_captured_piece(mv: Move) -> Option<PieceKind> {
    PieceKind::from_code((mv >> CAPTURED_PIECE_SHIFT) & PIECE_MASK)
}

#[inline]
pub const fn move_class(mv: Move) -> MoveClass {
    MoveClass::from_bits(mv >> CLASS_SHIFT)
}

#[inline]
pub const fn move_promotion_piece(mv: Move) -> Option<PieceKind> {
    match move_class(mv) {
        MoveClass::Promotion => {
            Some(SELECTOR_TO_KIND[((mv >> PROMOTION_SHIFT) & TWO_BIT_MASK) as usize])
        }
        _ => None,
    }
}

#[inline]
pub const fn move_side(mv: Move) -> Color {
    if mv & SIDE_BIT != 0 {
        Color::Light
    } else {
        Color::Dark
    }
}

#[inline]
pub const fn move_gives_check(mv: Move) -> bool {
    mv & GIVES_CHECK_BIT != 0
}

#[inline]
pub const fn move_is_capture(mv: Move) -> bool {
    (mv >> CAPTURED_PIECE_SHIFT) & PIECE_MASK != 0
}

#[inline]
pub const fn move_is_promotion(mv: Move) -> bool {
    matches!(move_class(mv), MoveClass::Promotion)
}

#[inline]
pub const fn move_is_castle(mv: Move) -> bool {
    matches!(move_class(mv), MoveClass::Castle)
}

/// Origin, destination and promotion piece only. Two encodings of the same
/// physical move (for example one parsed from text, one generated) compare
/// equal under this key.
#[inline]
pub const fn move_identity(mv: Move) -> Move {
    let squares = mv & ((SQUARE_MASK << TO_SHIFT) | SQUARE_MASK);
    match move_class(mv) {
        MoveClass::Promotion => squares | ((((mv >> PROMOTION_SHIFT) & TWO_BIT_MASK) + 1) << 12),
        _ => squares,
    }
}

/// Fixed-capacity move buffer living on the stack.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveList {
    #[inline]
    pub const fn new() -> Self {
        Self {
            moves: [NULL_MOVE; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES, "move list overflow");
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Move> {
        self.as_slice().get(index).copied()
    }

    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.as_mut_slice().swap(a, b);
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, Move>> {
        self.as_slice().iter().copied()
    }

    #[inline]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = Move;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|mv| format!("{mv:#08x}")))
            .finish()
    }
}
