//! Pluggable board evaluation interface and the material baseline.
//!
//! Search stays independent of evaluation by delegating static scoring to
//! this trait, so alternate heuristics can be swapped without touching the
//! search code.

use crate::game_state::{chess_types::*, game_state::GameState};

pub trait BoardScorer: Send + Sync {
    /// Score in centipawns from the perspective of the side to move.
    fn score(&self, game_state: &GameState) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl MaterialScorer {
    #[inline]
    pub const fn piece_value(piece: PieceKind) -> i32 {
        match piece {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 0,
        }
    }

    #[inline]
    fn material_balance_white_minus_black(game_state: &GameState) -> i32 {
        ALL_PIECE_KINDS
            .iter()
            .map(|&piece| {
                let light = game_state.piece_count_for(Color::Light, piece) as i32;
                let dark = game_state.piece_count_for(Color::Dark, piece) as i32;
                (light - dark) * Self::piece_value(piece)
            })
            .sum()
    }
}

impl BoardScorer for MaterialScorer {
    fn score(&self, game_state: &GameState) -> i32 {
        let white_minus_black = Self::material_balance_white_minus_black(game_state);
        match game_state.side_to_move {
            Color::Light => white_minus_black,
            Color::Dark => -white_minus_black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardScorer, MaterialScorer};
    use crate::game_state::game_state::GameState;

    #[test]
    fn start_position_is_balanced() {
        assert_eq!(MaterialScorer.score(&GameState::new_game()), 0);
    }

    #[test]
    fn score_flips_with_side_to_move() {
        let white = GameState::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").expect("FEN should parse");
        let black = GameState::from_fen("4k3/8/8/8/8/8/8/Q3K3 b - - 0 1").expect("FEN should parse");
        assert_eq!(MaterialScorer.score(&white), 900);
        assert_eq!(MaterialScorer.score(&black), -900);
    }
}
