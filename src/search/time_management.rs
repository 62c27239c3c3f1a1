//! Per-move time allocation from raw clock data.
//!
//! Front ends pass what they know about the clock for the side to move and
//! the engine decides how much of it one search may spend.

use std::time::Duration;

use crate::game_state::game_state::GameState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockParams {
    /// Fixed time for this move; overrides everything else.
    pub movetime_ms: Option<u64>,
    pub remaining_ms: Option<u64>,
    pub increment_ms: Option<u64>,
    pub moves_to_go: Option<u16>,
}

/// Budget for the next search, or `None` when the clock imposes no limit.
pub fn resolve_time_budget(game_state: &GameState, clock: &ClockParams) -> Option<Duration> {
    if let Some(movetime) = clock.movetime_ms {
        return Some(Duration::from_millis(movetime.max(1)));
    }
    let remaining = clock.remaining_ms?;
    Some(Duration::from_millis(adaptive_budget_ms(
        game_state,
        remaining,
        clock.increment_ms,
        clock.moves_to_go,
    )))
}

fn adaptive_budget_ms(
    game_state: &GameState,
    remaining_ms: u64,
    increment_ms: Option<u64>,
    moves_to_go: Option<u16>,
) -> u64 {
    let moves_played = u64::from(game_state.fullmove_number);
    let expected_moves_left = match moves_to_go {
        Some(mtg) => u64::from(mtg.max(1)),
        None if moves_played < 10 => 40,
        None if moves_played < 30 => 28,
        None => 18,
    };

    let reserve = (remaining_ms / 25).max(100).min(remaining_ms.saturating_sub(1));
    let usable = remaining_ms.saturating_sub(reserve);
    let base = usable / expected_moves_left;
    let increment_bonus = increment_ms.unwrap_or(0).saturating_mul(3) / 4;
    let panic = if remaining_ms < 2_000 { remaining_ms / 12 } else { 0 };
    let target = base.saturating_add(increment_bonus).saturating_add(panic);

    let floor = if remaining_ms < 1_000 { 5 } else { 15 };
    let ceiling = (remaining_ms / 4).max(1);
    target.max(floor).min(ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movetime_wins_over_clock() {
        let game = GameState::new_game();
        let clock = ClockParams {
            movetime_ms: Some(250),
            remaining_ms: Some(60_000),
            ..ClockParams::default()
        };
        assert_eq!(resolve_time_budget(&game, &clock), Some(Duration::from_millis(250)));
    }

    #[test]
    fn no_clock_means_unlimited() {
        assert_eq!(resolve_time_budget(&GameState::new_game(), &ClockParams::default()), None);
    }

    #[test]
    fn adaptive_budget_stays_within_bounds() {
        let game = GameState::new_game();
        for remaining in [10u64, 500, 5_000, 60_000, 600_000] {
            let clock = ClockParams {
                remaining_ms: Some(remaining),
                increment_ms: Some(1_000),
                ..ClockParams::default()
            };
            let budget = resolve_time_budget(&game, &clock)
                .expect("clock should yield a budget")
                .as_millis() as u64;
            assert!(budget >= 1);
            assert!(budget <= (remaining / 4).max(1), "{budget} for {remaining}");
        }
    }

    #[test]
    fn moves_to_go_splits_the_clock() {
        let game = GameState::new_game();
        let clock = ClockParams {
            remaining_ms: Some(100_000),
            moves_to_go: Some(10),
            ..ClockParams::default()
        };
        // 4% reserve, rest over ten moves.
        assert_eq!(
            resolve_time_budget(&game, &clock),
            Some(Duration::from_millis(9_600))
        );
    }
}
