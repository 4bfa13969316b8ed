//! The game-state aggregate, its wire form and the derived read model.
//!
//! `GameState` serializes to exactly the body the progress service stores
//! (camelCase keys). Decoding goes through `ProgressSnapshot`, which is
//! lenient about everything except `points` and is then resolved against
//! the local catalog so a sparse or stale remote body can never drop
//! catalog entries.

use crate::{
    achievement,
    catalog::{Achievement, Catalog, Upgrade, UpgradeKind},
    economy,
    error::{ClickerError, ClickerResult},
    types::{CatalogId, Level, Points, SkinId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Points-per-click a new player starts with.
pub const BASE_POINTS_PER_CLICK: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub points:            Points,
    pub total_clicks:      u64,
    pub level:             Level,
    pub points_per_click:  f64,
    pub points_per_second: f64,
    pub upgrades:          Vec<Upgrade>,
    pub achievements:      Vec<Achievement>,
    pub selected_skin:     SkinId,
    pub owned_skins:       BTreeSet<SkinId>,
}

impl GameState {
    /// Fresh state for a new player.
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            points:            0.0,
            total_clicks:      0,
            level:             1,
            points_per_click:  BASE_POINTS_PER_CLICK,
            points_per_second: 0.0,
            upgrades:          catalog.upgrades.clone(),
            achievements:      catalog.achievements.clone(),
            selected_skin:     catalog.default_skin.clone(),
            owned_skins:       BTreeSet::from([catalog.default_skin.clone()]),
        }
    }

    /// Build a state from a remote snapshot, resolved against `catalog`.
    ///
    /// Scalars are taken from the snapshot and clamped into their valid
    /// ranges. Upgrade and achievement entries are matched by id: the
    /// snapshot supplies `owned`/`cost`/`unlocked`, the catalog supplies
    /// identity, kind and multiplier. Ids unknown to the catalog are dropped.
    pub fn from_snapshot(snapshot: ProgressSnapshot, catalog: &Catalog) -> Self {
        let mut state = Self::new(catalog);

        state.points = snapshot.points.max(0.0);
        state.total_clicks = snapshot.total_clicks.unwrap_or(0);
        state.level = snapshot.level.unwrap_or(1).clamp(1, catalog.max_level());
        state.points_per_click = snapshot
            .points_per_click
            .unwrap_or(BASE_POINTS_PER_CLICK)
            .max(BASE_POINTS_PER_CLICK);
        state.points_per_second = snapshot.points_per_second.unwrap_or(0.0).max(0.0);

        let remote_upgrades: HashMap<CatalogId, UpgradeRecord> = snapshot
            .upgrades
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        for upgrade in &mut state.upgrades {
            if let Some(remote) = remote_upgrades.get(&upgrade.id) {
                upgrade.owned = remote.owned.unwrap_or(upgrade.owned);
                if let Some(cost) = remote.cost.filter(|c| *c >= upgrade.cost) {
                    upgrade.cost = cost;
                }
            }
        }

        let remote_unlocked: HashMap<CatalogId, bool> = snapshot
            .achievements
            .into_iter()
            .map(|a| (a.id, a.unlocked))
            .collect();
        for ach in &mut state.achievements {
            if let Some(unlocked) = remote_unlocked.get(&ach.id) {
                ach.unlocked = *unlocked;
            }
        }

        state.owned_skins.extend(
            snapshot
                .owned_skins
                .into_iter()
                .filter(|id| catalog.skin(id).is_some()),
        );
        if let Some(selected) = snapshot.selected_skin {
            if state.owned_skins.contains(&selected) {
                state.selected_skin = selected;
            }
        }

        state
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn owns_skin(&self, id: &str) -> bool {
        self.owned_skins.contains(id)
    }

    /// Points the next click will yield.
    pub fn earned_per_click(&self) -> Points {
        economy::click_yield(self.points_per_click, self.level)
    }

    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.unlocked).count()
    }

    pub fn achievement_count(&self) -> usize {
        self.achievements.len()
    }

    /// Click progress towards one achievement, `None` for an unknown id.
    pub fn achievement_progress_percent(&self, id: &str) -> Option<f64> {
        self.achievement(id)
            .map(|a| achievement::progress_percent(a, self.total_clicks))
    }

    pub fn next_level_threshold(&self, catalog: &Catalog) -> Option<Points> {
        economy::next_level_threshold(self.level, &catalog.level_thresholds)
    }

    pub fn level_progress_percent(&self, catalog: &Catalog) -> f64 {
        economy::level_progress_percent(self.points, self.level, &catalog.level_thresholds)
    }

    pub fn can_afford_upgrade(&self, id: &str) -> bool {
        self.upgrade(id).is_some_and(|u| self.points >= u.cost)
    }

    /// True only for a catalog skin not yet owned and within budget.
    pub fn can_afford_skin(&self, catalog: &Catalog, id: &str) -> bool {
        !self.owns_skin(id) && catalog.skin(id).is_some_and(|s| self.points >= s.cost)
    }
}

/// Decoded remote progress body.
///
/// Only `points` is mandatory; a body without it means "no saved progress".
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub points: Points,
    #[serde(default)]
    pub total_clicks: Option<u64>,
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default)]
    pub points_per_click: Option<f64>,
    #[serde(default)]
    pub points_per_second: Option<f64>,
    #[serde(default)]
    pub upgrades: Vec<UpgradeRecord>,
    #[serde(default)]
    pub achievements: Vec<AchievementRecord>,
    #[serde(default)]
    pub selected_skin: Option<SkinId>,
    #[serde(default)]
    pub owned_skins: Vec<SkinId>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UpgradeRecord {
    pub id: CatalogId,
    #[serde(default)]
    pub owned: Option<u32>,
    #[serde(default)]
    pub cost: Option<Points>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AchievementRecord {
    pub id: CatalogId,
    #[serde(default)]
    pub unlocked: bool,
}

impl ProgressSnapshot {
    /// Decode a response body. Anything that is not an object with a
    /// finite numeric `points` field is rejected as a whole.
    pub fn from_value(value: serde_json::Value) -> ClickerResult<Self> {
        match value.get("points") {
            None | Some(serde_json::Value::Null) => {
                return Err(ClickerError::MalformedSnapshot("missing `points`".into()))
            }
            Some(_) => {}
        }
        let snapshot: Self = serde_json::from_value(value)
            .map_err(|e| ClickerError::MalformedSnapshot(e.to_string()))?;
        let finite = [snapshot.points_per_click, snapshot.points_per_second]
            .into_iter()
            .flatten()
            .chain([snapshot.points])
            .all(f64::is_finite);
        if !finite {
            return Err(ClickerError::MalformedSnapshot("non-finite number".into()));
        }
        Ok(snapshot)
    }
}

// ── Read model ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeView {
    pub id:         CatalogId,
    pub name:       String,
    pub kind:       UpgradeKind,
    pub cost:       Points,
    pub owned:      u32,
    pub affordable: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AchievementView {
    pub id:               CatalogId,
    pub name:             String,
    pub unlocked:         bool,
    pub progress_percent: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkinView {
    pub id:         SkinId,
    pub name:       String,
    pub cost:       Points,
    pub owned:      bool,
    pub selected:   bool,
    pub affordable: bool,
}

/// Everything a UI needs to draw one frame, derived from state + catalog.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub points:                 Points,
    pub total_clicks:           u64,
    pub level:                  Level,
    pub level_multiplier:       f64,
    pub earned_per_click:       Points,
    pub points_per_second:      f64,
    pub level_progress_percent: f64,
    pub next_level_threshold:   Option<Points>,
    pub selected_skin:          SkinId,
    pub unlocked_achievements:  usize,
    pub total_achievements:     usize,
    pub upgrades:               Vec<UpgradeView>,
    pub achievements:           Vec<AchievementView>,
    pub skins:                  Vec<SkinView>,
}

impl GameView {
    pub fn build(state: &GameState, catalog: &Catalog) -> Self {
        Self {
            points:                 state.points,
            total_clicks:           state.total_clicks,
            level:                  state.level,
            level_multiplier:       economy::level_multiplier(state.level),
            earned_per_click:       state.earned_per_click(),
            points_per_second:      state.points_per_second,
            level_progress_percent: state.level_progress_percent(catalog),
            next_level_threshold:   state.next_level_threshold(catalog),
            selected_skin:          state.selected_skin.clone(),
            unlocked_achievements:  state.unlocked_count(),
            total_achievements:     state.achievement_count(),
            upgrades: state
                .upgrades
                .iter()
                .map(|u| UpgradeView {
                    id:         u.id.clone(),
                    name:       u.name.clone(),
                    kind:       u.kind,
                    cost:       u.cost,
                    owned:      u.owned,
                    affordable: state.can_afford_upgrade(&u.id),
                })
                .collect(),
            achievements: state
                .achievements
                .iter()
                .map(|a| AchievementView {
                    id:               a.id.clone(),
                    name:             a.name.clone(),
                    unlocked:         a.unlocked,
                    progress_percent: achievement::progress_percent(a, state.total_clicks),
                })
                .collect(),
            skins: catalog
                .skins
                .iter()
                .map(|s| SkinView {
                    id:         s.id.clone(),
                    name:       s.name.clone(),
                    cost:       s.cost,
                    owned:      state.owns_skin(&s.id),
                    selected:   state.selected_skin == s.id,
                    affordable: state.can_afford_skin(catalog, &s.id),
                })
                .collect(),
        }
    }
}
