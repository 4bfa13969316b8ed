//! Game engine tests: transitions, invariants and the reference scenarios.

mod common;

use clicker_core::{
    catalog::UpgradeKind,
    command::GameCommand,
    economy,
    engine::GameEngine,
    event::{GameEvent, Purchase},
    state::{GameState, ProgressSnapshot},
};

fn engine_with_points(points: f64) -> GameEngine {
    let catalog = common::catalog();
    let mut state = GameState::new(&catalog);
    state.points = points;
    GameEngine::with_state(catalog, state)
}

fn unlocked_ids(events: &[GameEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::AchievementUnlocked { achievement } => Some(achievement.id.clone()),
            _ => None,
        })
        .collect()
}

// ── Scenarios ───────────────────────────────────────────────────

#[test]
fn first_click_earns_one_point() {
    let mut engine = GameEngine::new(common::catalog());
    let events = engine.click();

    let state = engine.state();
    assert_eq!(state.points, 1.0);
    assert_eq!(state.total_clicks, 1);
    assert_eq!(state.level, 1);
    assert_eq!(
        events[0],
        GameEvent::Clicked { earned: 1.0, total_clicks: 1 }
    );
    assert_eq!(unlocked_ids(&events), ["ach1"]);
}

#[test]
fn buying_an_additive_upgrade_spends_everything() {
    let mut engine = engine_with_points(10.0);
    let events = engine.buy_upgrade("auto1");

    let state = engine.state();
    let auto1 = state.upgrade("auto1").unwrap();
    assert_eq!(state.points, 0.0);
    assert_eq!(auto1.owned, 1);
    assert_eq!(auto1.cost, 15.0);
    assert_eq!(state.points_per_second, 1.0);
    assert_eq!(state.points_per_click, 1.0, "additive upgrades never touch clicks");
    assert!(matches!(
        &events[0],
        GameEvent::Purchased { item: Purchase::Upgrade { id, owned: 1, .. }, cost } if id == "auto1" && *cost == 10.0
    ));
}

#[test]
fn ten_ticks_at_one_per_second_add_ten() {
    let mut engine = engine_with_points(10.0);
    engine.buy_upgrade("auto1");
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.state().points, 10.0);
}

#[test]
fn beginner_achievement_unlocks_exactly_once() {
    let mut engine = GameEngine::new(common::catalog());
    let mut beginner_unlocks = 0;
    for click in 1..=250u64 {
        let events = engine.click();
        let unlocked = unlocked_ids(&events);
        if unlocked.iter().any(|id| id == "ach2") {
            assert_eq!(click, 100, "ach2 must unlock on the 100th click");
            beginner_unlocks += 1;
        }
        let ach2 = engine.state().achievement("ach2").unwrap();
        assert_eq!(ach2.unlocked, click >= 100);
    }
    assert_eq!(beginner_unlocks, 1);
}

#[test]
fn reaching_first_threshold_levels_up_and_boosts_clicks() {
    let mut engine = engine_with_points(99.0);
    let events = engine.click();

    assert_eq!(engine.state().points, 100.0);
    assert_eq!(engine.state().level, 2);
    assert!(events.contains(&GameEvent::LevelUp { level: 2, multiplier: 1.5 }));

    let events = engine.click();
    assert_eq!(events[0], GameEvent::Clicked { earned: 1.5, total_clicks: 2 });
    assert_eq!(engine.state().points, 101.5);
}

// ── Properties ──────────────────────────────────────────────────

#[test]
fn points_equal_sum_of_per_click_yields() {
    let mut engine = GameEngine::new(common::catalog());
    let mut expected = 0.0;

    for n in 1..=600u64 {
        let state = engine.state();
        expected += state.points_per_click * economy::level_multiplier(state.level);
        engine.click();
        assert_eq!(engine.state().total_clicks, n);
    }
    assert!(
        (engine.state().points - expected).abs() < 1e-9,
        "points {} != expected {expected}",
        engine.state().points
    );
    assert!(engine.state().level > 1);
}

#[test]
fn purchase_never_drives_points_negative() {
    let mut engine = engine_with_points(60.0);
    for id in ["auto1", "mult1", "auto2", "mult1", "auto1", "auto1", "auto1"] {
        engine.buy_upgrade(id);
        assert!(engine.state().points >= 0.0);
    }
    // 60 - 10 (auto1) - 50 (mult1); nothing else affordable.
    assert_eq!(engine.state().points, 0.0);
}

#[test]
fn repeated_purchase_escalates_cost() {
    let mut engine = engine_with_points(1_000_000.0);
    let mut cost = engine.state().upgrade("auto3").unwrap().cost;
    for _ in 0..8 {
        engine.buy_upgrade("auto3");
        let next = engine.state().upgrade("auto3").unwrap().cost;
        assert_eq!(next, (cost * 1.5).floor());
        assert!(next > cost);
        cost = next;
    }
    assert_eq!(engine.state().points_per_second, 8.0 * 20.0);
}

#[test]
fn multiplicative_upgrade_scales_clicks_only() {
    let mut engine = engine_with_points(300.0);
    engine.buy_upgrade("mult1");
    engine.buy_upgrade("mult2");

    let state = engine.state();
    assert_eq!(state.upgrade("mult1").unwrap().kind, UpgradeKind::Multiplicative);
    assert_eq!(state.points_per_click, 10.0);
    assert_eq!(state.points_per_second, 0.0);
    assert_eq!(state.points, 0.0);
}

#[test]
fn invalid_purchases_change_nothing() {
    let mut engine = engine_with_points(5.0);
    let before = engine.state().clone();

    assert!(engine.buy_upgrade("auto1").is_empty(), "too expensive");
    assert!(engine.buy_upgrade("turbo9").is_empty(), "unknown id");
    assert!(engine.buy_skin("Star").is_empty(), "too expensive");
    assert!(engine.buy_skin("Rainbow").is_empty(), "unknown skin");
    assert!(engine.buy_skin("Sparkles").is_empty(), "already owned");

    assert_eq!(engine.state(), &before);
}

#[test]
fn buying_and_selecting_a_skin() {
    let mut engine = engine_with_points(600.0);

    assert!(engine.select_skin("Star").is_empty(), "cannot select before owning");
    assert_eq!(engine.state().selected_skin, "Sparkles");

    let events = engine.buy_skin("Star");
    assert_eq!(events.len(), 1);
    assert_eq!(engine.state().points, 100.0);
    assert!(engine.state().owns_skin("Star"));
    assert!(engine.state().owns_skin("Sparkles"), "default skin is never lost");

    assert_eq!(engine.select_skin("Star"), vec![GameEvent::SkinSelected { id: "Star".into() }]);
    assert_eq!(engine.state().selected_skin, "Star");
    assert!(engine.select_skin("Star").is_empty(), "reselecting is a no-op");
}

#[test]
fn select_unowned_skin_leaves_state_equal() {
    let mut engine = engine_with_points(42.0);
    let before = engine.state().clone();
    engine.select_skin("Gem");
    assert_eq!(engine.state(), &before);
}

#[test]
fn tick_without_income_is_silent() {
    let mut engine = engine_with_points(99.5);
    let before = engine.state().clone();
    assert!(engine.tick().is_empty());
    assert_eq!(engine.state(), &before);
}

#[test]
fn tick_can_level_up() {
    let mut engine = engine_with_points(110.0);
    engine.buy_upgrade("auto2"); // 10 points left, +5/s
    let mut level_ups = Vec::new();
    for _ in 0..60 {
        for event in engine.tick() {
            if let GameEvent::LevelUp { level, .. } = event {
                level_ups.push(level);
            }
        }
    }
    // Already level 2; 10 + 60 * 5 = 310 points crosses 300 only.
    assert_eq!(engine.state().points, 310.0);
    assert_eq!(level_ups, [3]);
}

#[test]
fn level_never_decreases_after_spending() {
    let mut engine = engine_with_points(320.0);
    assert_eq!(engine.state().level, 3);
    engine.buy_upgrade("mult2");
    assert_eq!(engine.state().points, 70.0);
    assert_eq!(engine.state().level, 3, "spending must not lower the level");
}

#[test]
fn level_is_capped_at_table_length() {
    let mut engine = engine_with_points(1_000_000.0);
    assert_eq!(engine.state().level, 10);
    let events = engine.click();
    assert!(!events.iter().any(|e| matches!(e, GameEvent::LevelUp { .. })));
    assert_eq!(engine.state().level, 10);
}

#[test]
fn apply_dispatches_commands() {
    let mut engine = engine_with_points(10.0);
    engine.apply(&GameCommand::BuyUpgrade { id: "auto1".into() });
    engine.apply(&GameCommand::Tick);
    engine.apply(&GameCommand::Click);
    assert_eq!(engine.state().points, 2.0);
    assert_eq!(engine.state().total_clicks, 1);
}

#[test]
fn commands_use_tagged_json() {
    let cmd: GameCommand = serde_json::from_str(r#"{"cmd":"buy_upgrade","id":"mult1"}"#).unwrap();
    assert_eq!(cmd, GameCommand::BuyUpgrade { id: "mult1".into() });
    let click: GameCommand = serde_json::from_str(r#"{"cmd":"click"}"#).unwrap();
    assert_eq!(click, GameCommand::Click);
}

// ── Snapshots ───────────────────────────────────────────────────

#[test]
fn snapshot_round_trip_restores_every_field() {
    let mut engine = engine_with_points(2_000.0);
    engine.buy_upgrade("auto1");
    engine.buy_upgrade("mult1");
    engine.buy_upgrade("auto1");
    engine.buy_skin("Heart");
    engine.select_skin("Heart");
    for _ in 0..150 {
        engine.click();
    }
    engine.tick();
    let original = engine.state().clone();

    let body = serde_json::to_value(&original).unwrap();
    let snapshot = ProgressSnapshot::from_value(body).unwrap();
    let mut fresh = GameEngine::new(common::catalog());
    fresh.load(snapshot);

    assert_eq!(fresh.state(), &original);
}

#[test]
fn wire_body_uses_camel_case_keys() {
    let state = GameState::new(&common::catalog());
    let body = serde_json::to_value(&state).unwrap();
    for key in [
        "points", "totalClicks", "level", "pointsPerClick", "pointsPerSecond",
        "upgrades", "achievements", "selectedSkin", "ownedSkins",
    ] {
        assert!(body.get(key).is_some(), "missing `{key}` in {body}");
    }
}

#[test]
fn body_without_points_is_malformed() {
    for body in [
        serde_json::json!({}),
        serde_json::json!({ "error": "Unauthorized" }),
        serde_json::json!({ "points": null, "totalClicks": 3 }),
        serde_json::json!({ "points": "lots" }),
        serde_json::json!([1, 2, 3]),
    ] {
        assert!(ProgressSnapshot::from_value(body.clone()).is_err(), "accepted {body}");
    }
}

#[test]
fn server_default_body_keeps_catalog() {
    // What the progress service answers for a player with no saved row.
    let body = serde_json::json!({
        "points": 0, "totalClicks": 0, "level": 1,
        "pointsPerClick": 1, "pointsPerSecond": 0,
        "upgrades": [], "achievements": [],
        "selectedSkin": "Sparkles", "ownedSkins": ["Sparkles"]
    });
    let mut engine = GameEngine::new(common::catalog());
    engine.load(ProgressSnapshot::from_value(body).unwrap());

    assert_eq!(engine.state(), &GameState::new(&common::catalog()));
}

#[test]
fn load_sanitizes_corrupted_fields() {
    let body = serde_json::json!({
        "points": -50,
        "level": 99,
        "pointsPerClick": 0.25,
        "pointsPerSecond": -3,
        "upgrades": [{ "id": "auto1", "owned": 2, "cost": 22 }, { "id": "ghost", "owned": 9 }],
        "achievements": [{ "id": "ach1", "unlocked": true }],
        "selectedSkin": "Gem",
        "ownedSkins": ["Star", "Unicorn"]
    });
    let mut engine = GameEngine::new(common::catalog());
    engine.load(ProgressSnapshot::from_value(body).unwrap());

    let state = engine.state();
    assert_eq!(state.points, 0.0);
    assert_eq!(state.level, 10);
    assert_eq!(state.points_per_click, 1.0);
    assert_eq!(state.points_per_second, 0.0);
    assert_eq!(state.upgrade("auto1").unwrap().owned, 2);
    assert_eq!(state.upgrade("auto1").unwrap().cost, 22.0);
    assert!(state.upgrade("ghost").is_none());
    assert!(state.achievement("ach1").unwrap().unlocked);
    assert_eq!(state.selected_skin, "Sparkles", "Gem is not owned");
    assert!(state.owns_skin("Star") && state.owns_skin("Sparkles"));
    assert!(!state.owns_skin("Unicorn"));
}

#[test]
fn view_reports_derived_values() {
    let mut engine = engine_with_points(200.0);
    engine.buy_upgrade("mult1");
    let view = engine.view();

    assert_eq!(view.level, 2);
    assert_eq!(view.level_multiplier, 1.5);
    assert_eq!(view.earned_per_click, 3.0);
    assert_eq!(view.next_level_threshold, Some(300.0));
    assert_eq!(view.level_progress_percent, 25.0);
    assert_eq!(view.total_achievements, 5);
    assert!(view.upgrades.iter().find(|u| u.id == "auto1").unwrap().affordable);
    assert!(!view.upgrades.iter().find(|u| u.id == "auto3").unwrap().affordable);
    let sparkles = view.skins.iter().find(|s| s.id == "Sparkles").unwrap();
    assert!(sparkles.owned && sparkles.selected && !sparkles.affordable);
}

#[test]
fn state_helpers_match_the_view() {
    let catalog = common::catalog();
    let mut engine = engine_with_points(450.0);
    for _ in 0..25 {
        engine.click();
    }
    let state = engine.state();

    assert_eq!(state.achievement_count(), 5);
    assert_eq!(state.unlocked_count(), 1);
    assert_eq!(state.achievement_progress_percent("ach2"), Some(25.0));
    assert_eq!(state.achievement_progress_percent("ach1"), Some(100.0));
    assert_eq!(state.achievement_progress_percent("nope"), None);

    let view = engine.view();
    assert_eq!(state.next_level_threshold(&catalog), view.next_level_threshold);
    assert_eq!(state.level_progress_percent(&catalog), view.level_progress_percent);

    assert!(state.can_afford_skin(&catalog, "Star"));
    assert!(!state.can_afford_skin(&catalog, "Heart"), "too expensive");
    assert!(!state.can_afford_skin(&catalog, "Sparkles"), "already owned");
    assert!(!state.can_afford_skin(&catalog, "Unicorn"), "not in the catalog");
}
