//! End-of-game scoring for the single-player mode.
//!
//! Score is `rounds × multiplier(remaining life)`. Fewer lives left pays a
//! bigger multiplier, so a long game survived on the last life scores best.

/// Multiplier for the life the player ends the game with.
pub fn life_multiplier(life: u8) -> u32 {
    match life {
        5 => 50,
        4 => 100,
        3 => 150,
        2 => 200,
        1 => 300,
        _ => 0,
    }
}

/// Final score for a finished single-player game.
pub fn score(final_round: u32, final_life: u8) -> u32 {
    final_round.saturating_mul(life_multiplier(final_life))
}
