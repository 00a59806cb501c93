//! Bonus computation for registration, publication, and debtor sales.
//!
//! Everything here is a pure function of its arguments: records and rate
//! settings go in, monetary breakdowns come out.

mod calculators;
pub mod domain;
mod engine;
mod evolution;
pub mod period;
pub mod rates;

#[cfg(test)]
mod tests;

pub use calculators::{
    calculate_debtor, calculate_publication, calculate_registration, DebtorBonus,
    MethodSubtotals, PublicationBonus, RegistrationBonus,
};
pub use domain::{
    Category, MethodQuantities, PaymentMethod, TransactionKind, TransactionRecord, UserId,
};
pub use engine::{BonusEngine, MonthlyReport};
pub use evolution::{
    evolution_percentage, period_bonus, rank_users, user_evolution, MonthBonus, PeriodBonus,
    RankingEntry, RankingPeriod, UserEvolution,
};
pub use period::{aggregate, aggregate_by_month, DateRange, DebtorTotals, PeriodSummary, Scope};
pub use rates::{DebtorTierTable, RateConfigError, RateConfiguration};
