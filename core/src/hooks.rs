//! Notification/audio hooks.
//!
//! Hooks are fire-and-forget: the session calls them after a transition
//! has committed and never looks at the outcome. A panicking hook is caught
//! and logged; it cannot roll back or stall the game.

use crate::{
    catalog::Achievement,
    event::{GameEvent, Purchase},
    types::Level,
};
use std::panic::{catch_unwind, AssertUnwindSafe};

pub trait GameHooks: Send + Sync {
    fn on_click(&self) {}

    fn on_level_up(&self, _level: Level, _multiplier: f64) {}

    fn on_achievement_unlocked(&self, _achievement: &Achievement) {}

    fn on_purchase(&self, _item: &Purchase) {}
}

/// Hooks that do nothing.
pub struct NoopHooks;

impl GameHooks for NoopHooks {}

/// Hooks that write every notification to the log.
pub struct LogHooks;

impl GameHooks for LogHooks {
    fn on_level_up(&self, level: Level, multiplier: f64) {
        log::info!("🎉 Уровень {level}! Множитель очков: x{multiplier:.1}");
    }

    fn on_achievement_unlocked(&self, achievement: &Achievement) {
        log::info!("🏆 Достижение: {}: {}", achievement.name, achievement.description);
    }

    fn on_purchase(&self, item: &Purchase) {
        log::info!("Куплено: {}", item.name());
    }
}

/// Deliver events to `hooks` in order, once each.
pub fn dispatch(hooks: &dyn GameHooks, events: &[GameEvent]) {
    for event in events {
        let outcome = catch_unwind(AssertUnwindSafe(|| match event {
            GameEvent::Clicked { .. } => hooks.on_click(),
            GameEvent::LevelUp { level, multiplier } => hooks.on_level_up(*level, *multiplier),
            GameEvent::AchievementUnlocked { achievement } => {
                hooks.on_achievement_unlocked(achievement)
            }
            GameEvent::Purchased { item, .. } => hooks.on_purchase(item),
            GameEvent::PassiveIncome { .. }
            | GameEvent::SkinSelected { .. }
            | GameEvent::StateReplaced { .. } => {}
        }));
        if outcome.is_err() {
            log::warn!("hook panicked while handling {}", crate::event::event_type_name(event));
        }
    }
}
