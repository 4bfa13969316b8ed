//! Economy model: level curve, click yield and upgrade cost escalation.
//!
//! Pure functions only. Nothing here reads or writes game state.
//!
//! Levels are 1-indexed: `thresholds[i]` is the lifetime point total needed
//! to reach level `i + 1`, and `thresholds[0]` is always 0. The table is
//! finite; past the last entry the level stays pinned at `thresholds.len()`.

use crate::types::{Level, Points};

/// Bonus applied per level above 1.
pub const LEVEL_MULTIPLIER_STEP: f64 = 0.5;

/// Factor applied to an upgrade's cost after each purchase (then floored).
pub const UPGRADE_COST_GROWTH: f64 = 1.5;

/// Click yield multiplier for a level: `1 + (level - 1) * 0.5`.
pub fn level_multiplier(level: Level) -> f64 {
    1.0 + level.saturating_sub(1) as f64 * LEVEL_MULTIPLIER_STEP
}

/// Greatest level whose threshold `points` has reached, capped at the
/// table length. Never below 1.
pub fn compute_level(points: Points, thresholds: &[Points]) -> Level {
    let reached = thresholds.iter().take_while(|&&t| points >= t).count();
    reached.max(1) as Level
}

/// Point total required for the level after `level`, if the table has one.
pub fn next_level_threshold(level: Level, thresholds: &[Points]) -> Option<Points> {
    thresholds.get(level as usize).copied()
}

/// Progress towards the next level in percent, clamped to [0, 100].
///
/// At the top of the table there is no next threshold; progress is reported
/// as 100.
pub fn level_progress_percent(points: Points, level: Level, thresholds: &[Points]) -> f64 {
    let level = level.max(1);
    let Some(next) = next_level_threshold(level, thresholds) else {
        return 100.0;
    };
    let prev = thresholds
        .get(level as usize - 1)
        .copied()
        .unwrap_or(0.0);
    let span = next - prev;
    if span <= 0.0 {
        return 100.0;
    }
    ((points - prev) / span * 100.0).clamp(0.0, 100.0)
}

/// Cost of an upgrade after one more purchase: `floor(cost * 1.5)`.
pub fn next_upgrade_cost(current_cost: Points) -> Points {
    (current_cost * UPGRADE_COST_GROWTH).floor()
}

/// Points one click yields at the given level.
pub fn click_yield(points_per_click: f64, level: Level) -> Points {
    points_per_click * level_multiplier(level)
}
