use super::calculators::{calculate_publication, calculate_registration};
use super::domain::{TransactionRecord, UserId};
use super::period::{aggregate, aggregate_by_month, previous_month, DateRange, Scope};
use super::rates::RateConfiguration;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Window used when comparing or ranking bonuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPeriod {
    #[default]
    Month,
    Quarter,
    Year,
}

impl RankingPeriod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Month => "Month",
            Self::Quarter => "Quarter",
            Self::Year => "Year to date",
        }
    }

    pub fn range(self, reference: NaiveDate) -> DateRange {
        match self {
            Self::Month => DateRange::month_of(reference),
            Self::Quarter => DateRange::trailing_quarter(reference),
            Self::Year => DateRange::year_to_date(reference),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "month" | "mes" | "mês" => Some(Self::Month),
            "quarter" | "trimestre" => Some(Self::Quarter),
            "year" | "ano" | "ytd" => Some(Self::Year),
            _ => None,
        }
    }
}

/// Registration plus publication bonus earned over a range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodBonus {
    pub range: DateRange,
    pub registration: f64,
    pub publication: f64,
    pub total: f64,
}

pub fn period_bonus(
    records: &[TransactionRecord],
    range: DateRange,
    scope: &Scope,
    config: &RateConfiguration,
) -> PeriodBonus {
    let summary = aggregate(records, range, scope);
    let registration = calculate_registration(summary.registration, config).total;
    let publication = calculate_publication(summary.publication, config).total;

    PeriodBonus {
        range,
        registration,
        publication,
        total: registration + publication,
    }
}

/// Month-over-month change in percent. A zero baseline reads as 100% when
/// anything was earned and 0% otherwise.
pub fn evolution_percentage(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthBonus {
    pub month: NaiveDate,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserEvolution {
    pub user_id: UserId,
    pub reference_month: NaiveDate,
    pub month: PeriodBonus,
    pub previous_month: PeriodBonus,
    pub quarter: PeriodBonus,
    pub year: PeriodBonus,
    pub evolution_pct: f64,
    pub history: Vec<MonthBonus>,
}

pub fn user_evolution(
    records: &[TransactionRecord],
    user: &UserId,
    reference: NaiveDate,
    config: &RateConfiguration,
) -> UserEvolution {
    let scope = Scope::User(user.clone());
    let month = period_bonus(records, DateRange::month_of(reference), &scope, config);
    let previous = period_bonus(
        records,
        DateRange::month_of(previous_month(reference)),
        &scope,
        config,
    );
    let quarter = period_bonus(
        records,
        DateRange::trailing_quarter(reference),
        &scope,
        config,
    );
    let year_range = DateRange::year_to_date(reference);
    let year = period_bonus(records, year_range, &scope, config);

    let history = aggregate_by_month(records, year_range, &scope)
        .into_iter()
        .map(|summary| MonthBonus {
            month: summary.range.start,
            total: calculate_registration(summary.registration, config).total
                + calculate_publication(summary.publication, config).total,
        })
        .collect();

    UserEvolution {
        user_id: user.clone(),
        reference_month: month.range.start,
        evolution_pct: evolution_percentage(month.total, previous.total),
        month,
        previous_month: previous,
        quarter,
        year,
        history,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub position: usize,
    pub user_id: UserId,
    pub bonus: PeriodBonus,
}

/// Ranks every user found in `records` by bonus over `period`, highest
/// first. Users start ordered by id and the sort is stable, so ties keep that
/// order.
pub fn rank_users(
    records: &[TransactionRecord],
    reference: NaiveDate,
    period: RankingPeriod,
    config: &RateConfiguration,
) -> Vec<RankingEntry> {
    let range = period.range(reference);
    let users: BTreeSet<&UserId> = records.iter().map(|record| &record.user_id).collect();

    let mut scored: Vec<(UserId, PeriodBonus)> = users
        .into_iter()
        .map(|user| {
            let scope = Scope::User(user.clone());
            (user.clone(), period_bonus(records, range, &scope, config))
        })
        .collect();
    scored.sort_by(|a, b| b.1.total.total_cmp(&a.1.total));

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (user_id, bonus))| RankingEntry {
            position: index + 1,
            user_id,
            bonus,
        })
        .collect()
}
