//! Coordinate move notation (`e2e4`, `e7e8q`).

use crate::errors::NotationError;
use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_generator::generate_legal_moves;
use crate::moves::move_descriptions::{
    move_from, move_identity, move_promotion_piece, move_to, MoveList,
};
use crate::utils::algebraic::{algebraic_to_square, square_name};

pub fn move_to_long_algebraic(mv: Move) -> String {
    let mut out = square_name(move_from(mv));
    out.push_str(&square_name(move_to(mv)));
    if let Some(promotion) = move_promotion_piece(mv) {
        out.push(promotion.letter().to_ascii_lowercase());
    }
    out
}

/// Resolve coordinate text to the generator's encoding of that legal move.
pub fn long_algebraic_to_move(game_state: &GameState, text: &str) -> Result<Move, NotationError> {
    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(NotationError::MalformedMove(text.to_owned()));
    }

    let from = algebraic_to_square(&text[0..2])?;
    let to = algebraic_to_square(&text[2..4])?;
    let promotion = match text.as_bytes().get(4) {
        None => None,
        Some(b'q') | Some(b'Q') => Some(PieceKind::Queen),
        Some(b'r') | Some(b'R') => Some(PieceKind::Rook),
        Some(b'b') | Some(b'B') => Some(PieceKind::Bishop),
        Some(b'n') | Some(b'N') => Some(PieceKind::Knight),
        Some(_) => return Err(NotationError::MalformedMove(text.to_owned())),
    };

    let mut list = MoveList::new();
    generate_legal_moves(game_state, &mut list);
    list.iter()
        .find(|&mv| {
            move_from(mv) == from && move_to(mv) == to && move_promotion_piece(mv) == promotion
        })
        .ok_or_else(|| NotationError::NoMatchingMove(text.to_owned()))
}

/// Compare two moves by the squares and promotion they describe.
#[inline]
pub fn same_move(a: Move, b: Move) -> bool {
    move_identity(a) == move_identity(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_plain_and_promotion_moves() {
        let game = GameState::new_game();
        let mv = long_algebraic_to_move(&game, "g1f3").expect("move should parse");
        assert_eq!(move_to_long_algebraic(mv), "g1f3");

        let game = GameState::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let mv = long_algebraic_to_move(&game, "a7a8q").expect("promotion should parse");
        assert_eq!(move_promotion_piece(mv), Some(PieceKind::Queen));
        assert_eq!(move_to_long_algebraic(mv), "a7a8q");
        let under = long_algebraic_to_move(&game, "a7a8n").expect("underpromotion should parse");
        assert!(!same_move(mv, under));
    }

    #[test]
    fn rejects_illegal_and_malformed_text() {
        let game = GameState::new_game();
        assert!(matches!(
            long_algebraic_to_move(&game, "e2e5"),
            Err(NotationError::NoMatchingMove(_))
        ));
        assert!(matches!(
            long_algebraic_to_move(&game, "e2"),
            Err(NotationError::MalformedMove(_))
        ));
        assert!(matches!(
            long_algebraic_to_move(&game, "z2e4"),
            Err(NotationError::InvalidSquare(_))
        ));
        // Promotion suffix on a non-promoting move matches nothing.
        assert!(long_algebraic_to_move(&game, "e2e4q").is_err());
    }
}
