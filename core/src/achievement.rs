//! Achievement evaluator.
//!
//! An achievement moves `locked -> unlocked` exactly once, when the lifetime
//! click count reaches its requirement. Nothing ever locks it again, even if
//! the click count read from a corrupted save is lower than before.

use crate::catalog::Achievement;

/// Unlock every achievement whose requirement `total_clicks` has reached.
///
/// Returns the updated list and the achievements unlocked by this pass,
/// in definition order. Running it again with the same inputs unlocks nothing.
pub fn evaluate(
    achievements: &[Achievement],
    total_clicks: u64,
) -> (Vec<Achievement>, Vec<Achievement>) {
    let mut updated = achievements.to_vec();
    let newly_unlocked = unlock_reached(&mut updated, total_clicks);
    (updated, newly_unlocked)
}

/// In-place form of [`evaluate`], used by the engine on its owned state.
pub fn unlock_reached(achievements: &mut [Achievement], total_clicks: u64) -> Vec<Achievement> {
    achievements
        .iter_mut()
        .filter(|a| !a.unlocked && total_clicks >= a.requirement)
        .map(|a| {
            a.unlocked = true;
            a.clone()
        })
        .collect()
}

/// How close `total_clicks` is to the requirement, in percent, capped at 100.
pub fn progress_percent(achievement: &Achievement, total_clicks: u64) -> f64 {
    if achievement.unlocked || achievement.requirement == 0 {
        return 100.0;
    }
    (total_clicks as f64 / achievement.requirement as f64 * 100.0).min(100.0)
}
