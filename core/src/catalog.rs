//! Static catalog: upgrades, achievements, skins and level thresholds.
//!
//! The catalog fixes the identity set of everything the player can own.
//! Only `owned`/`cost` of an upgrade and `unlocked` of an achievement ever
//! change at runtime; everything else here is immutable after startup.

use crate::{
    error::{ClickerError, ClickerResult},
    types::{CatalogId, Points, SkinId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a purchased upgrade affects the economy.
/// Fixed at catalog-definition time, never inferred from the id.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Adds `multiplier` to points-per-second.
    Additive,
    /// Multiplies points-per-click by `multiplier`.
    Multiplicative,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Upgrade {
    pub id:          CatalogId,
    pub name:        String,
    pub description: String,
    pub cost:        Points,
    pub multiplier:  f64,
    pub owned:       u32,
    pub icon:        String,
    pub kind:        UpgradeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id:          CatalogId,
    pub name:        String,
    pub description: String,
    pub requirement: u64,
    pub unlocked:    bool,
    pub icon:        String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skin {
    pub id:   SkinId,
    pub name: String,
    pub icon: String,
    pub cost: Points,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub upgrades:         Vec<Upgrade>,
    pub achievements:     Vec<Achievement>,
    pub skins:            Vec<Skin>,
    pub level_thresholds: Vec<Points>,
    pub default_skin:     SkinId,
}

impl Catalog {
    /// The catalog the game ships with.
    pub fn builtin() -> Self {
        Self {
            upgrades: vec![
                upgrade("auto1", "Автокликер", "+1 очко в секунду", 10.0, 1.0, "MousePointerClick", UpgradeKind::Additive),
                upgrade("mult1", "Усилитель", "x2 к кликам", 50.0, 2.0, "Zap", UpgradeKind::Multiplicative),
                upgrade("auto2", "Робот-кликер", "+5 очков в секунду", 100.0, 5.0, "Bot", UpgradeKind::Additive),
                upgrade("mult2", "Супер усилитель", "x5 к кликам", 250.0, 5.0, "Sparkles", UpgradeKind::Multiplicative),
                upgrade("auto3", "Фабрика кликов", "+20 очков в секунду", 500.0, 20.0, "Factory", UpgradeKind::Additive),
            ],
            achievements: vec![
                achievement("ach1", "Первый клик", "Сделайте 1 клик", 1, "MousePointerClick"),
                achievement("ach2", "Новичок", "Сделайте 100 кликов", 100, "Award"),
                achievement("ach3", "Профессионал", "Сделайте 1000 кликов", 1_000, "Trophy"),
                achievement("ach4", "Мастер кликов", "Сделайте 10000 кликов", 10_000, "Crown"),
                achievement("ach5", "Легенда", "Сделайте 100000 кликов", 100_000, "Star"),
            ],
            skins: vec![
                skin("Sparkles", "Искры", 0.0),
                skin("Star", "Звезда", 500.0),
                skin("Heart", "Сердце", 1_000.0),
                skin("Flame", "Пламя", 2_500.0),
                skin("Crown", "Корона", 5_000.0),
                skin("Gem", "Кристалл", 10_000.0),
            ],
            level_thresholds: vec![
                0.0, 100.0, 300.0, 600.0, 1_000.0, 1_500.0, 2_200.0, 3_000.0, 4_000.0, 5_500.0,
            ],
            default_skin: "Sparkles".into(),
        }
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn skin(&self, id: &str) -> Option<&Skin> {
        self.skins.iter().find(|s| s.id == id)
    }

    /// Highest reachable level.
    pub fn max_level(&self) -> u32 {
        self.level_thresholds.len() as u32
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> ClickerResult<()> {
        let invalid = |msg: String| Err(ClickerError::InvalidCatalog(msg));

        match self.level_thresholds.first() {
            None => return invalid("level thresholds are empty".into()),
            Some(first) if *first != 0.0 => {
                return invalid(format!("first level threshold must be 0, got {first}"))
            }
            _ => {}
        }
        if self.level_thresholds.windows(2).any(|w| !(w[0] < w[1])) {
            return invalid("level thresholds must be strictly ascending".into());
        }

        let mut seen = HashSet::new();
        for u in &self.upgrades {
            if !seen.insert(u.id.as_str()) {
                return invalid(format!("duplicate upgrade id '{}'", u.id));
            }
            // floor(cost * 1.5) only grows strictly from 2 upward.
            if !(u.cost >= 2.0) {
                return invalid(format!("upgrade '{}' cost must be >= 2, got {}", u.id, u.cost));
            }
            if !(u.multiplier > 0.0) {
                return invalid(format!("upgrade '{}' multiplier must be positive", u.id));
            }
            if u.kind == UpgradeKind::Multiplicative && u.multiplier < 1.0 {
                return invalid(format!("multiplicative upgrade '{}' would shrink clicks", u.id));
            }
        }

        seen.clear();
        for a in &self.achievements {
            if !seen.insert(a.id.as_str()) {
                return invalid(format!("duplicate achievement id '{}'", a.id));
            }
        }

        seen.clear();
        for s in &self.skins {
            if !seen.insert(s.id.as_str()) {
                return invalid(format!("duplicate skin id '{}'", s.id));
            }
            if !(s.cost >= 0.0) {
                return invalid(format!("skin '{}' has a negative cost", s.id));
            }
        }
        if self.skin(&self.default_skin).is_none() {
            return invalid(format!("default skin '{}' is not in the catalog", self.default_skin));
        }

        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self { Self::builtin() }
}

fn upgrade(
    id: &str,
    name: &str,
    description: &str,
    cost: Points,
    multiplier: f64,
    icon: &str,
    kind: UpgradeKind,
) -> Upgrade {
    Upgrade {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        cost,
        multiplier,
        owned: 0,
        icon: icon.into(),
        kind,
    }
}

fn achievement(id: &str, name: &str, description: &str, requirement: u64, icon: &str) -> Achievement {
    Achievement {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        requirement,
        unlocked: false,
        icon: icon.into(),
    }
}

fn skin(icon: &str, name: &str, cost: Points) -> Skin {
    Skin {
        id: icon.into(),
        name: name.into(),
        icon: icon.into(),
        cost,
    }
}
