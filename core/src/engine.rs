//! The game engine: every state transition lives here.
//!
//! RULES:
//!   - Each operation mutates, then settles, then returns its events.
//!   - Settling re-derives level and achievements after any change to
//!     points or the click count; an operation is not finished before that.
//!   - Invalid commands (unknown id, not enough points, skin not owned)
//!     change nothing and return no events.
//!   - The engine is synchronous and owns its state. Serialization against
//!     concurrent callers is the session's job, not the engine's.

use crate::{
    achievement,
    catalog::{Catalog, UpgradeKind},
    command::GameCommand,
    economy,
    event::{event_type_name, GameEvent, Purchase},
    state::{GameState, GameView, ProgressSnapshot},
};
use std::sync::Arc;

pub struct GameEngine {
    catalog: Arc<Catalog>,
    state:   GameState,
}

impl GameEngine {
    /// Engine for a new player.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let state = GameState::new(&catalog);
        Self { catalog, state }
    }

    /// Engine resuming from an existing state.
    pub fn with_state(catalog: Arc<Catalog>, state: GameState) -> Self {
        let mut engine = Self { catalog, state };
        engine.settle(&mut Vec::new());
        engine
    }

    pub fn state(&self) -> &GameState { &self.state }

    pub fn catalog(&self) -> &Catalog { &self.catalog }

    pub fn into_state(self) -> GameState { self.state }

    pub fn view(&self) -> GameView {
        GameView::build(&self.state, &self.catalog)
    }

    /// Dispatch one command.
    pub fn apply(&mut self, command: &GameCommand) -> Vec<GameEvent> {
        let events = match command {
            GameCommand::Click             => self.click(),
            GameCommand::BuyUpgrade { id } => self.buy_upgrade(id),
            GameCommand::BuySkin { id }    => self.buy_skin(id),
            GameCommand::SelectSkin { id } => self.select_skin(id),
            GameCommand::Tick              => self.tick(),
        };
        for event in &events {
            log::debug!("{} -> {}", command.name(), event_type_name(event));
        }
        events
    }

    pub fn click(&mut self) -> Vec<GameEvent> {
        let earned = self.state.earned_per_click();
        self.state.points += earned;
        self.state.total_clicks += 1;

        let mut events = vec![GameEvent::Clicked {
            earned,
            total_clicks: self.state.total_clicks,
        }];
        self.settle(&mut events);
        events
    }

    pub fn buy_upgrade(&mut self, id: &str) -> Vec<GameEvent> {
        let points = self.state.points;
        let Some(upgrade) = self.state.upgrades.iter_mut().find(|u| u.id == id) else {
            log::debug!("buy_upgrade: unknown upgrade '{id}'");
            return vec![];
        };
        if points < upgrade.cost {
            log::debug!("buy_upgrade: '{id}' costs {} but only {points:.1} available", upgrade.cost);
            return vec![];
        }

        let cost = upgrade.cost;
        upgrade.owned += 1;
        upgrade.cost = economy::next_upgrade_cost(cost);
        let (kind, multiplier) = (upgrade.kind, upgrade.multiplier);
        let item = Purchase::Upgrade {
            id:    upgrade.id.clone(),
            name:  upgrade.name.clone(),
            owned: upgrade.owned,
        };

        self.state.points -= cost;
        match kind {
            UpgradeKind::Additive       => self.state.points_per_second += multiplier,
            UpgradeKind::Multiplicative => self.state.points_per_click *= multiplier,
        }

        let mut events = vec![GameEvent::Purchased { item, cost }];
        self.settle(&mut events);
        events
    }

    pub fn buy_skin(&mut self, id: &str) -> Vec<GameEvent> {
        let Some(skin) = self.catalog.skin(id) else {
            log::debug!("buy_skin: unknown skin '{id}'");
            return vec![];
        };
        if self.state.owns_skin(id) {
            log::debug!("buy_skin: '{id}' already owned");
            return vec![];
        }
        if self.state.points < skin.cost {
            log::debug!("buy_skin: '{id}' costs {} but only {:.1} available", skin.cost, self.state.points);
            return vec![];
        }

        let cost = skin.cost;
        let item = Purchase::Skin { id: skin.id.clone(), name: skin.name.clone() };
        self.state.points -= cost;
        self.state.owned_skins.insert(skin.id.clone());

        let mut events = vec![GameEvent::Purchased { item, cost }];
        self.settle(&mut events);
        events
    }

    pub fn select_skin(&mut self, id: &str) -> Vec<GameEvent> {
        if !self.state.owns_skin(id) {
            log::debug!("select_skin: '{id}' not owned");
            return vec![];
        }
        if self.state.selected_skin == id {
            return vec![];
        }
        self.state.selected_skin = id.to_string();
        vec![GameEvent::SkinSelected { id: id.to_string() }]
    }

    /// One passive-income step. A no-op while nothing produces income.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let amount = self.state.points_per_second;
        if amount <= 0.0 {
            return vec![];
        }
        self.state.points += amount;

        let mut events = vec![GameEvent::PassiveIncome { amount }];
        self.settle(&mut events);
        events
    }

    /// Replace the whole state with a decoded remote snapshot.
    pub fn load(&mut self, snapshot: ProgressSnapshot) -> Vec<GameEvent> {
        self.state = GameState::from_snapshot(snapshot, &self.catalog);
        let mut events = Vec::new();
        self.settle(&mut events);
        events
    }

    /// Re-derive level and achievements. Both only ever move forward.
    fn settle(&mut self, events: &mut Vec<GameEvent>) {
        let level = economy::compute_level(self.state.points, &self.catalog.level_thresholds);
        if level > self.state.level {
            self.state.level = level;
            let multiplier = economy::level_multiplier(level);
            log::info!("Level up: {level} (x{multiplier:.1})");
            events.push(GameEvent::LevelUp { level, multiplier });
        }

        let unlocked = achievement::unlock_reached(&mut self.state.achievements, self.state.total_clicks);
        for achievement in unlocked {
            log::info!("Achievement unlocked: {} ({})", achievement.name, achievement.id);
            events.push(GameEvent::AchievementUnlocked { achievement });
        }
    }
}
