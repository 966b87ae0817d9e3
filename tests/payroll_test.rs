mod common;

use common::{QUALIFIED, WON, World, at, date};
use leadpay::domain::money::Money;
use leadpay::domain::ports::LedgerStore;
use leadpay::error::PayrollError;
use rust_decimal_macros::dec;

async fn january(world: &World) {
    world.period(1, date(2024, 1, 1), date(2024, 1, 31)).await;
}

#[tokio::test]
async fn test_one_entry_per_active_rep() {
    let mut world = World::new().await;
    january(&world).await;
    world.rep(1, "closer", dec!(1000.00), true).await;
    world.rep(2, "setter", dec!(850.50), true).await;
    world.rep(3, "closer", dec!(900), false).await;
    world.rule(WON, "closer", dec!(100)).await;

    let lead = world.lead(Some(1)).await;
    world.change(lead, WON, None, at(2024, 1, 10, 9, 0, 0)).await;

    let run = world.engine.compute_payroll(1).await.unwrap();
    assert_eq!(run.pay_period_id, 1);

    let entries = world.ledger.entries(run.id).await.unwrap();
    assert_eq!(entries.len(), 2);
    for entry in &entries {
        assert_eq!(entry.payroll_run_id, run.id);
        assert_eq!(entry.total_compensation, entry.base_pay + entry.total_bonus);
    }

    let ana = entries.iter().find(|e| e.rep_id == 1).unwrap();
    assert_eq!(ana.total_bonus, Money::new(dec!(100)));
    assert_eq!(ana.total_compensation, Money::new(dec!(1100.00)));

    // Rep 2 had no events but still gets an entry.
    let ben = entries.iter().find(|e| e.rep_id == 2).unwrap();
    assert_eq!(ben.total_bonus, Money::ZERO);
    assert_eq!(ben.total_compensation, Money::new(dec!(850.50)));
}

#[tokio::test]
async fn test_locked_period_fails_without_writing() {
    let world = World::new().await;
    january(&world).await;
    world.rep(1, "closer", dec!(1000), true).await;
    world.registry.lock_pay_period(1).await.unwrap();

    for _ in 0..2 {
        let err = world.engine.compute_payroll(1).await.unwrap_err();
        assert!(matches!(err, PayrollError::PeriodLocked(1)));
    }
    assert!(world.ledger.runs_for_period(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_period_is_not_found() {
    let world = World::new().await;
    let err = world.engine.compute_payroll(404).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_override_wins_over_rule() {
    let mut world = World::new().await;
    january(&world).await;
    world.rep(1, "closer", dec!(0), true).await;
    world.rep(2, "closer", dec!(0), true).await;
    world.rule(WON, "closer", dec!(100)).await;
    world.bonus_override(1, WON, dec!(175.25)).await;

    let lead = world.lead(None).await;
    world.change(lead, WON, Some(1), at(2024, 1, 3, 12, 0, 0)).await;
    world.change(lead, WON, Some(2), at(2024, 1, 4, 12, 0, 0)).await;

    let run = world.engine.compute_payroll(1).await.unwrap();
    let entries = world.ledger.entries(run.id).await.unwrap();

    assert_eq!(entries[0].total_bonus, Money::new(dec!(175.25)));
    assert_eq!(entries[1].total_bonus, Money::new(dec!(100)));
}

#[tokio::test]
async fn test_status_without_rule_or_override_earns_nothing() {
    let mut world = World::new().await;
    january(&world).await;
    world.rep(1, "closer", dec!(500), true).await;
    world.rule(WON, "setter", dec!(100)).await;

    let lead = world.lead(Some(1)).await;
    world.change(lead, QUALIFIED, None, at(2024, 1, 3, 12, 0, 0)).await;
    world.change(lead, WON, None, at(2024, 1, 4, 12, 0, 0)).await;

    let run = world.engine.compute_payroll(1).await.unwrap();
    let entries = world.ledger.entries(run.id).await.unwrap();
    assert_eq!(entries[0].total_bonus, Money::ZERO);
}

#[tokio::test]
async fn test_recomputing_an_open_period_records_a_second_run() {
    // Repeated runs are not deduplicated; each keeps its own entries.
    let mut world = World::new().await;
    january(&world).await;
    world.rep(1, "closer", dec!(1000), true).await;
    world.rule(WON, "closer", dec!(10)).await;
    let lead = world.lead(Some(1)).await;
    world.change(lead, WON, None, at(2024, 1, 15, 8, 0, 0)).await;

    let first = world.engine.compute_payroll(1).await.unwrap();
    let second = world.engine.compute_payroll(1).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(world.ledger.runs_for_period(1).await.unwrap().len(), 2);

    let first_entries = world.ledger.entries(first.id).await.unwrap();
    let second_entries = world.ledger.entries(second.id).await.unwrap();
    assert_eq!(first_entries.len(), 1);
    assert_eq!(second_entries.len(), 1);
    assert_ne!(first_entries[0].id, second_entries[0].id);
    assert_eq!(first_entries[0].total_bonus, second_entries[0].total_bonus);
}

#[tokio::test]
async fn test_window_boundaries_are_inclusive() {
    let mut world = World::new().await;
    january(&world).await;
    world.rep(1, "closer", dec!(0), true).await;
    world.rule(WON, "closer", dec!(1)).await;
    let lead = world.lead(Some(1)).await;

    let last_millisecond = date(2024, 1, 31)
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap();
    let included = [at(2024, 1, 1, 0, 0, 0), last_millisecond];
    let excluded = [
        at(2023, 12, 31, 23, 59, 59),
        last_millisecond + chrono::Duration::seconds(1),
    ];
    for changed_at in included.into_iter().chain(excluded) {
        world.change(lead, WON, None, changed_at).await;
    }

    let run = world.engine.compute_payroll(1).await.unwrap();
    let entries = world.ledger.entries(run.id).await.unwrap();
    assert_eq!(entries[0].total_bonus, Money::new(dec!(2)));
}

#[tokio::test]
async fn test_unattributed_event_is_skipped() {
    let mut world = World::new().await;
    january(&world).await;
    world.rep(1, "closer", dec!(700), true).await;
    world.rule(WON, "closer", dec!(100)).await;

    let orphan = world.lead(None).await;
    world.change(orphan, WON, None, at(2024, 1, 9, 14, 0, 0)).await;

    let run = world.engine.compute_payroll(1).await.unwrap();
    let entries = world.ledger.entries(run.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].total_bonus, Money::ZERO);
    assert_eq!(entries[0].total_compensation, Money::new(dec!(700)));
}

#[tokio::test]
async fn test_actor_takes_credit_over_assignee() {
    let mut world = World::new().await;
    january(&world).await;
    world.rep(1, "closer", dec!(0), true).await;
    world.rep(2, "closer", dec!(0), true).await;
    world.rule(WON, "closer", dec!(100)).await;

    let lead = world.lead(Some(2)).await;
    world.change(lead, WON, Some(1), at(2024, 1, 9, 14, 0, 0)).await;

    let run = world.engine.compute_payroll(1).await.unwrap();
    let entries = world.ledger.entries(run.id).await.unwrap();
    assert_eq!(entries[0].total_bonus, Money::new(dec!(100)));
    assert_eq!(entries[1].total_bonus, Money::ZERO);
}

#[tokio::test]
async fn test_summary_joins_names() {
    let world = World::new().await;
    january(&world).await;
    world.rep(1, "closer", dec!(1000), true).await;
    world.rep(2, "setter", dec!(800), true).await;

    world.engine.compute_payroll(1).await.unwrap();
    let rows = world.engine.payroll_summary(1).await.unwrap();

    let names: Vec<_> = rows.iter().map(|r| r.rep_name.as_str()).collect();
    assert_eq!(names, ["Rep 1", "Rep 2"]);
    assert_eq!(rows[1].total_compensation, Money::new(dec!(800)));
}
