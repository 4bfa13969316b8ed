//! Observable transitions.
//!
//! The engine returns these from every operation, after the mutation has
//! committed and level/achievements have been re-derived. Hooks and the
//! runner consume them; nothing feeds them back into the engine.

use crate::{
    catalog::Achievement,
    types::{CatalogId, Generation, Level, Points},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Clicked {
        earned:       Points,
        total_clicks: u64,
    },
    PassiveIncome {
        amount: Points,
    },
    LevelUp {
        level:      Level,
        multiplier: f64,
    },
    AchievementUnlocked {
        achievement: Achievement,
    },
    Purchased {
        item: Purchase,
        cost: Points,
    },
    SkinSelected {
        id: CatalogId,
    },
    StateReplaced {
        generation: Generation,
    },
}

/// What a successful purchase bought.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Purchase {
    Upgrade { id: CatalogId, name: String, owned: u32 },
    Skin { id: CatalogId, name: String },
}

impl Purchase {
    pub fn name(&self) -> &str {
        match self {
            Self::Upgrade { name, .. } | Self::Skin { name, .. } => name,
        }
    }
}

/// Extract a stable string name from a GameEvent variant.
pub fn event_type_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::Clicked { .. }             => "clicked",
        GameEvent::PassiveIncome { .. }       => "passive_income",
        GameEvent::LevelUp { .. }             => "level_up",
        GameEvent::AchievementUnlocked { .. } => "achievement_unlocked",
        GameEvent::Purchased { .. }           => "purchased",
        GameEvent::SkinSelected { .. }        => "skin_selected",
        GameEvent::StateReplaced { .. }       => "state_replaced",
    }
}
