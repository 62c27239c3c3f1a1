//! Draw recognition used by the search before move generation.

use crate::game_state::game_state::GameState;

/// Score of a drawn position for either side.
pub const VALUE_DRAW: i32 = 0;

/// Fifty-move rule, threefold repetition or a material draw.
#[inline]
pub fn is_draw(game_state: &GameState) -> bool {
    game_state.is_fifty_move_draw()
        || game_state.is_insufficient_material()
        || game_state.is_threefold_repetition()
}

/// `Some(VALUE_DRAW)` when the position is a rule draw, for early returns.
#[inline]
pub fn draw_score(game_state: &GameState) -> Option<i32> {
    is_draw(game_state).then_some(VALUE_DRAW)
}
