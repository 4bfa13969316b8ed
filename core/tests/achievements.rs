//! Achievement evaluator tests.

use clicker_core::{
    achievement::{evaluate, progress_percent},
    catalog::Catalog,
};

#[test]
fn unlocks_everything_reached_in_definition_order() {
    let achievements = Catalog::builtin().achievements;
    let (updated, newly) = evaluate(&achievements, 1_000);

    let ids: Vec<&str> = newly.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["ach1", "ach2", "ach3"]);
    assert!(updated[..3].iter().all(|a| a.unlocked));
    assert!(updated[3..].iter().all(|a| !a.unlocked));
}

#[test]
fn input_slice_is_left_untouched() {
    let achievements = Catalog::builtin().achievements;
    let _ = evaluate(&achievements, 100_000);
    assert!(achievements.iter().all(|a| !a.unlocked));
}

#[test]
fn second_pass_unlocks_nothing() {
    let achievements = Catalog::builtin().achievements;
    let (updated, first) = evaluate(&achievements, 150);
    assert_eq!(first.len(), 2);

    let (again, second) = evaluate(&updated, 150);
    assert!(second.is_empty(), "re-evaluation must be idempotent");
    assert_eq!(again, updated);
}

#[test]
fn lower_click_count_never_relocks() {
    let achievements = Catalog::builtin().achievements;
    let (updated, _) = evaluate(&achievements, 100);

    // A corrupted save reporting fewer clicks than before.
    let (after_reset, newly) = evaluate(&updated, 0);
    assert!(newly.is_empty());
    assert!(after_reset[0].unlocked && after_reset[1].unlocked);
}

#[test]
fn requirement_is_inclusive() {
    let achievements = Catalog::builtin().achievements;
    let (_, at_99) = evaluate(&achievements, 99);
    assert_eq!(at_99.len(), 1);
    let (_, at_100) = evaluate(&achievements, 100);
    assert_eq!(at_100.len(), 2);
}

#[test]
fn progress_is_capped_at_hundred() {
    let catalog = Catalog::builtin();
    let beginner = catalog.achievement("ach2").unwrap();
    assert_eq!(progress_percent(beginner, 25), 25.0);
    assert_eq!(progress_percent(beginner, 400), 100.0);
}
