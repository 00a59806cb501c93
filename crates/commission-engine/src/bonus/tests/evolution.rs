use super::common::*;
use crate::bonus::engine::BonusEngine;
use crate::bonus::evolution::{
    evolution_percentage, period_bonus, rank_users, user_evolution, RankingPeriod,
};
use crate::bonus::period::{DateRange, Scope};

#[test]
fn evolution_percentage_handles_zero_baseline() {
    assert_eq!(evolution_percentage(0.0, 0.0), 0.0);
    assert_eq!(evolution_percentage(500.0, 0.0), 100.0);
    assert_eq!(evolution_percentage(150.0, 100.0), 50.0);
    assert_eq!(evolution_percentage(50.0, 100.0), -50.0);
}

#[test]
fn period_bonus_combines_registration_and_publication() {
    let records = sample_records();
    let config = example_config();

    let bonus = period_bonus(
        &records,
        DateRange::month_of(date(2025, 3, 1)),
        &Scope::User(user("bruno")),
        &config,
    );

    assert_eq!(bonus.registration, 250.0);
    assert_eq!(bonus.publication, 1000.0);
    assert_eq!(bonus.total, 1250.0);
}

#[test]
fn user_evolution_rolls_up_month_quarter_and_year() {
    let records = sample_records();
    let config = example_config();

    let evolution = user_evolution(&records, &user("ana"), date(2025, 3, 18), &config);

    assert_eq!(evolution.reference_month, date(2025, 3, 1));
    assert_eq!(evolution.previous_month.total, 600.0);
    assert_eq!(evolution.month.registration, 3000.0);
    assert_eq!(evolution.month.publication, 40.0);
    assert_eq!(evolution.month.total, 3040.0);
    assert!((evolution.evolution_pct - 406.666_666).abs() < 1e-3);

    assert_eq!(evolution.quarter.range.start, date(2025, 1, 1));
    assert_eq!(evolution.quarter.total, 4140.0);
    assert_eq!(evolution.year.total, 4140.0);

    let history: Vec<f64> = evolution.history.iter().map(|month| month.total).collect();
    assert_eq!(history, vec![0.0, 600.0, 3040.0]);
}

#[test]
fn user_without_activity_has_flat_evolution() {
    let records = sample_records();
    let config = example_config();

    let evolution = user_evolution(&records, &user("carla"), date(2025, 3, 1), &config);

    assert_eq!(evolution.month.total, 0.0);
    assert_eq!(evolution.evolution_pct, 0.0);
}

#[test]
fn ranking_sorts_by_selected_period_descending() {
    let records = sample_records();
    let config = example_config();

    let march = rank_users(&records, date(2025, 3, 1), RankingPeriod::Month, &config);
    assert_eq!(march.len(), 2);
    assert_eq!(march[0].position, 1);
    assert_eq!(march[0].user_id, user("ana"));
    assert_eq!(march[0].bonus.total, 3040.0);
    assert_eq!(march[1].user_id, user("bruno"));

    let april = rank_users(&records, date(2025, 4, 1), RankingPeriod::Month, &config);
    assert_eq!(april[0].user_id, user("bruno"));
    assert_eq!(april[0].bonus.total, 300.0);
    assert_eq!(april[1].bonus.total, 0.0);
}

#[test]
fn ranking_ties_keep_user_order() {
    let records = sample_records();
    let config = example_config();

    let january = rank_users(&records, date(2025, 1, 1), RankingPeriod::Quarter, &config);

    assert_eq!(january[0].user_id, user("ana"));
    assert_eq!(january[1].user_id, user("bruno"));
    assert!(january.iter().all(|entry| entry.bonus.total == 0.0));
}

#[test]
fn engine_monthly_report_includes_debtor_bonus() {
    let records = sample_records();
    let engine = BonusEngine::new(example_config());

    let report = engine.monthly_report(&records, date(2025, 3, 5), &Scope::User(user("ana")));

    assert_eq!(report.registration.total, 3000.0);
    assert!(report.registration.goal_reached);
    assert_eq!(report.publication.total, 40.0);
    assert_eq!(report.debtor.per_installment, 500.0);
    assert_eq!(report.debtor.total, 100.0);
    assert_eq!(report.total, 3140.0);
}

#[test]
fn engine_delegates_evolution_and_ranking() {
    let records = sample_records();
    let config = example_config();
    let engine = BonusEngine::new(config.clone());

    assert_eq!(
        engine.evolution(&records, &user("bruno"), date(2025, 3, 1)),
        user_evolution(&records, &user("bruno"), date(2025, 3, 1), &config)
    );
    assert_eq!(
        engine.ranking(&records, date(2025, 3, 1), RankingPeriod::Year),
        rank_users(&records, date(2025, 3, 1), RankingPeriod::Year, &config)
    );
}
