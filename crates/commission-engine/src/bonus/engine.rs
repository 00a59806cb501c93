use super::calculators::{
    calculate_debtor, calculate_publication, calculate_registration, DebtorBonus,
    PublicationBonus, RegistrationBonus,
};
use super::domain::{MethodQuantities, TransactionRecord, UserId};
use super::evolution::{rank_users, user_evolution, RankingEntry, RankingPeriod, UserEvolution};
use super::period::{aggregate, DateRange, PeriodSummary, Scope};
use super::rates::RateConfiguration;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Stateless evaluator that applies one rate configuration to transactions.
#[derive(Debug, Clone)]
pub struct BonusEngine {
    config: RateConfiguration,
}

impl BonusEngine {
    pub fn new(config: RateConfiguration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RateConfiguration {
        &self.config
    }

    pub fn registration(&self, quantities: MethodQuantities) -> RegistrationBonus {
        calculate_registration(quantities, &self.config)
    }

    pub fn publication(&self, quantities: MethodQuantities) -> PublicationBonus {
        calculate_publication(quantities, &self.config)
    }

    pub fn debtor(&self, resolved_amount: f64, paid_installments: u32) -> DebtorBonus {
        calculate_debtor(resolved_amount, paid_installments, &self.config)
    }

    /// Every category's bonus for the month containing `reference`.
    pub fn monthly_report(
        &self,
        records: &[TransactionRecord],
        reference: NaiveDate,
        scope: &Scope,
    ) -> MonthlyReport {
        let summary = aggregate(records, DateRange::month_of(reference), scope);
        let registration = self.registration(summary.registration);
        let publication = self.publication(summary.publication);
        let debtor = self.debtor(
            summary.debtor.resolved_amount,
            summary.debtor.paid_installments,
        );
        let total = registration.total + publication.total + debtor.total;

        debug!(
            month = %summary.range.start,
            records = summary.record_count,
            total,
            "monthly bonus computed"
        );

        MonthlyReport {
            summary,
            registration,
            publication,
            debtor,
            total,
        }
    }

    pub fn evolution(
        &self,
        records: &[TransactionRecord],
        user: &UserId,
        reference: NaiveDate,
    ) -> UserEvolution {
        user_evolution(records, user, reference, &self.config)
    }

    pub fn ranking(
        &self,
        records: &[TransactionRecord],
        reference: NaiveDate,
        period: RankingPeriod,
    ) -> Vec<RankingEntry> {
        rank_users(records, reference, period, &self.config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub summary: PeriodSummary,
    pub registration: RegistrationBonus,
    pub publication: PublicationBonus,
    pub debtor: DebtorBonus,
    pub total: f64,
}
