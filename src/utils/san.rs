//! Standard algebraic notation (`Nbd2`, `exd6`, `e8=Q+`, `O-O-O#`).
//!
//! SAN is derived from a legal move together with the position it is played
//! in. Parsing works the other way round: the text is matched against the
//! SAN of every legal move, falling back to a looser reading that tolerates
//! missing capture markers or extra disambiguation.

use crate::errors::NotationError;
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_apply::make_move_in_place;
use crate::move_generation::legal_move_generator::{generate_legal_moves, has_legal_moves};
use crate::moves::move_descriptions::{
    move_from, move_is_capture, move_is_castle, move_moved_piece,
    move_promotion_piece, move_to, MoveList,
};
use crate::utils::algebraic::{algebraic_to_square, square_name};

pub fn move_to_san(game_state: &GameState, mv: Move) -> String {
    let mut list = MoveList::new();
    generate_legal_moves(game_state, &mut list);
    let mut out = san_body(&list, mv);

    let mut after = game_state.clone();
    make_move_in_place(&mut after, mv);
    if after.is_in_check() {
        out.push(if has_legal_moves(&after) { '+' } else { '#' });
    }
    out
}

/// SAN of each move of `line`, played in order from `game_state`.
pub fn line_to_san(game_state: &GameState, line: &[Move]) -> String {
    let mut state = game_state.clone();
    let mut parts = Vec::with_capacity(line.len());
    for &mv in line {
        parts.push(move_to_san(&state, mv));
        make_move_in_place(&mut state, mv);
    }
    parts.join(" ")
}

fn san_body(legal: &MoveList, mv: Move) -> String {
    let from = move_from(mv);
    let to = move_to(mv);

    if move_is_castle(mv) {
        return if square_file(to) > square_file(from) {
            "O-O".to_owned()
        } else {
            "O-O-O".to_owned()
        };
    }

    let moved = move_moved_piece(mv);
    let mut out = String::new();

    if moved == PieceKind::Pawn {
        if move_is_capture(mv) {
            out.push(file_char(from));
        }
    } else {
        out.push(moved.letter());
        let rivals: Vec<Square> = legal
            .iter()
            .filter(|&other| {
                move_moved_piece(other) == moved
                    && move_to(other) == to
                    && move_from(other) != from
            })
            .map(move_from)
            .collect();
        if !rivals.is_empty() {
            if rivals.iter().all(|&sq| square_file(sq) != square_file(from)) {
                out.push(file_char(from));
            } else if rivals.iter().all(|&sq| square_rank(sq) != square_rank(from)) {
                out.push(rank_char(from));
            } else {
                out.push(file_char(from));
                out.push(rank_char(from));
            }
        }
    }

    if move_is_capture(mv) {
        out.push('x');
    }
    out.push_str(&square_name(to));
    if let Some(promotion) = move_promotion_piece(mv) {
        out.push('=');
        out.push(promotion.letter());
    }
    out
}

#[inline]
fn file_char(square: Square) -> char {
    char::from(b'a' + square_file(square))
}

#[inline]
fn rank_char(square: Square) -> char {
    char::from(b'1' + square_rank(square))
}

fn trim_annotation_suffix(text: &str) -> &str {
    text.trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'))
}

pub fn san_to_move(game_state: &GameState, text: &str) -> Result<Move, NotationError> {
    let wanted = trim_annotation_suffix(text.trim()).replace('0', "O");
    if wanted.is_empty() {
        return Err(NotationError::MalformedMove(text.to_owned()));
    }

    let mut list = MoveList::new();
    generate_legal_moves(game_state, &mut list);
    if let Some(mv) = list.iter().find(|&mv| san_body(&list, mv) == wanted) {
        return Ok(mv);
    }
    if wanted.starts_with("O-O") {
        return Err(NotationError::NoMatchingMove(text.to_owned()));
    }

    loose_match(&list, &wanted, text)
}

/// Piece letter, optional origin hints, destination, optional promotion.
fn loose_match(list: &MoveList, wanted: &str, original: &str) -> Result<Move, NotationError> {
    let malformed = || NotationError::MalformedMove(original.to_owned());
    let cleaned: Vec<char> = wanted.chars().filter(|&c| c != 'x' && c != '=').collect();

    let (kind, mut rest) = match cleaned.first() {
        Some('N') => (PieceKind::Knight, &cleaned[1..]),
        Some('B') => (PieceKind::Bishop, &cleaned[1..]),
        Some('R') => (PieceKind::Rook, &cleaned[1..]),
        Some('Q') => (PieceKind::Queen, &cleaned[1..]),
        Some('K') => (PieceKind::King, &cleaned[1..]),
        Some(_) => (PieceKind::Pawn, &cleaned[..]),
        None => return Err(malformed()),
    };

    let promotion = match rest.last() {
        Some('Q') => Some(PieceKind::Queen),
        Some('R') => Some(PieceKind::Rook),
        Some('B') => Some(PieceKind::Bishop),
        Some('N') => Some(PieceKind::Knight),
        _ => None,
    };
    if promotion.is_some() {
        rest = &rest[..rest.len() - 1];
    }
    if rest.len() < 2 {
        return Err(malformed());
    }

    let (hints, destination) = rest.split_at(rest.len() - 2);
    let destination: String = destination.iter().collect();
    let to = algebraic_to_square(&destination)?;

    let mut file_hint = None;
    let mut rank_hint = None;
    for &hint in hints {
        match hint {
            'a'..='h' => file_hint = Some(hint as u8 - b'a'),
            '1'..='8' => rank_hint = Some(hint as u8 - b'1'),
            _ => return Err(malformed()),
        }
    }

    let mut candidates = list.iter().filter(|&mv| {
        move_moved_piece(mv) == kind
            && !move_is_castle(mv)
            && move_to(mv) == to
            && move_promotion_piece(mv) == promotion
            && file_hint.map_or(true, |file| square_file(move_from(mv)) == file)
            && rank_hint.map_or(true, |rank| square_rank(move_from(mv)) == rank)
    });

    match (candidates.next(), candidates.next()) {
        (Some(mv), None) => Ok(mv),
        (Some(_), Some(_)) => Err(NotationError::AmbiguousMove(original.to_owned())),
        (None, _) => Err(NotationError::NoMatchingMove(original.to_owned())),
    }
}
