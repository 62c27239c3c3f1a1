//! Reversible move application.
//!
//! `make_move_in_place` and `unmake_move_in_place` mutate a `GameState` and
//! keep the Zobrist key current by XOR-ing only the features that change.
//! They trust their input: the move must come from the generator for the
//! current position. `apply_move` is the checked, copying entry point for
//! moves that arrive from outside.

use crate::errors::MoveError;
use crate::game_state::chess_rules::{CastlingMove, CASTLING_MOVES, CASTLING_RIGHTS_KEEP};
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_generator::find_legal_move;
use crate::moves::leaper_attacks::pawn_attacks;
use crate::moves::move_descriptions::{
    move_captured_piece, move_class, move_from, move_moved_piece, move_promotion_piece, move_to,
    MoveClass,
};
use crate::search::zobrist::{castling_key, en_passant_file_key, side_to_move_key};

/// Validate `mv` against the legal moves of `game_state` and return the
/// resulting position. The input state is left untouched.
pub fn apply_move(game_state: &GameState, mv: Move) -> Result<GameState, MoveError> {
    let legal = find_legal_move(game_state, mv).ok_or(MoveError::IllegalMove(mv))?;
    let mut next = game_state.clone();
    make_move_in_place(&mut next, legal);
    Ok(next)
}

#[inline]
fn castling_move_for(color: Color, king_from: Square, king_to: Square) -> Option<&'static CastlingMove> {
    CASTLING_MOVES[color.index()]
        .iter()
        .find(|castle| castle.king_from == king_from && castle.king_to == king_to)
}

/// Square of the pawn removed by an en-passant capture landing on `to`.
#[inline]
fn en_passant_victim(mover: Color, to: Square) -> Square {
    match mover {
        Color::Light => to - 8,
        Color::Dark => to + 8,
    }
}

pub fn make_move_in_place(game_state: &mut GameState, mv: Move) {
    let us = game_state.side_to_move;
    let them = us.opposite();
    let from = move_from(mv);
    let to = move_to(mv);
    let moved = move_moved_piece(mv);
    let captured = move_captured_piece(mv);
    let class = move_class(mv);
    let prev_en_passant = game_state.en_passant_square;

    game_state.undo_stack.push(UndoState {
        mv,
        prev_castling_rights: game_state.castling_rights,
        prev_en_passant_square: prev_en_passant,
        prev_halfmove_clock: game_state.halfmove_clock,
        prev_fullmove_number: game_state.fullmove_number,
        prev_zobrist_key: game_state.zobrist_key,
    });

    if let Some(ep) = prev_en_passant {
        game_state.zobrist_key ^= en_passant_file_key(square_file(ep));
        game_state.en_passant_square = None;
    }

    match class {
        MoveClass::Castle => {
            if let Some(castle) = castling_move_for(us, from, to) {
                game_state.move_piece(castle.king_from, castle.king_to);
                game_state.move_piece(castle.rook_from, castle.rook_to);
            }
        }
        _ => {
            if captured.is_some() {
                if moved == PieceKind::Pawn && prev_en_passant == Some(to) {
                    game_state.remove_piece(en_passant_victim(us, to));
                } else {
                    game_state.remove_piece(to);
                }
            }

            match move_promotion_piece(mv) {
                Some(promotion) => {
                    game_state.remove_piece(from);
                    game_state.put_piece(us, promotion, to);
                }
                None => game_state.move_piece(from, to),
            }

            if moved == PieceKind::Pawn && from.abs_diff(to) == 16 {
                let ep = (from + to) / 2;
                // Only record a target an enemy pawn can actually use.
                if pawn_attacks(us, ep) & game_state.pieces_of(them, PieceKind::Pawn) != 0 {
                    game_state.en_passant_square = Some(ep);
                    game_state.zobrist_key ^= en_passant_file_key(square_file(ep));
                }
            }
        }
    }

    let old_rights = game_state.castling_rights;
    let new_rights = old_rights & CASTLING_RIGHTS_KEEP[from as usize] & CASTLING_RIGHTS_KEEP[to as usize];
    if new_rights != old_rights {
        game_state.zobrist_key ^= castling_key(old_rights) ^ castling_key(new_rights);
        game_state.castling_rights = new_rights;
    }

    if moved == PieceKind::Pawn || captured.is_some() {
        game_state.halfmove_clock = 0;
    } else {
        game_state.halfmove_clock = game_state.halfmove_clock.saturating_add(1);
    }
    if us == Color::Dark {
        game_state.fullmove_number = game_state.fullmove_number.saturating_add(1);
    }

    game_state.side_to_move = them;
    game_state.zobrist_key ^= side_to_move_key();
    game_state.ply = game_state.ply.wrapping_add(1);
    game_state.repetition_history.push(game_state.zobrist_key);
}

/// Reverse the most recent `make_move_in_place`. Returns `false` and leaves
/// the state unchanged when no move has been made.
pub fn unmake_move_in_place(game_state: &mut GameState) -> bool {
    let Some(undo) = game_state.undo_stack.pop() else {
        return false;
    };

    let us = game_state.side_to_move.opposite();
    let them = us.opposite();
    let mv = undo.mv;
    let from = move_from(mv);
    let to = move_to(mv);
    let moved = move_moved_piece(mv);

    match move_class(mv) {
        MoveClass::Castle => {
            if let Some(castle) = castling_move_for(us, from, to) {
                game_state.move_piece(castle.rook_to, castle.rook_from);
                game_state.move_piece(castle.king_to, castle.king_from);
            }
        }
        _ => {
            if move_promotion_piece(mv).is_some() {
                game_state.remove_piece(to);
                game_state.put_piece(us, PieceKind::Pawn, from);
            } else {
                game_state.move_piece(to, from);
            }

            if let Some(captured) = move_captured_piece(mv) {
                if moved == PieceKind::Pawn && undo.prev_en_passant_square == Some(to) {
                    game_state.put_piece(them, PieceKind::Pawn, en_passant_victim(us, to));
                } else {
                    game_state.put_piece(them, captured, to);
                }
            }
        }
    }

    game_state.side_to_move = us;
    game_state.castling_rights = undo.prev_castling_rights;
    game_state.en_passant_square = undo.prev_en_passant_square;
    game_state.halfmove_clock = undo.prev_halfmove_clock;
    game_state.fullmove_number = undo.prev_fullmove_number;
    game_state.zobrist_key = undo.prev_zobrist_key;
    game_state.ply = game_state.ply.wrapping_sub(1);
    game_state.repetition_history.pop();

    true
}
