use crate::bonus::rates::RateConfiguration;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtorBonus {
    pub resolved_amount: f64,
    pub paid_installments: u32,
    pub per_installment: f64,
    pub tier: usize,
    pub tier_label: String,
    pub bonus_per_installment: f64,
    pub total: f64,
}

/// Debtor collection bonus. The tier is chosen from the value of a single
/// installment, not from the resolved amount, and the tier rate is then paid
/// once per installment.
pub fn calculate_debtor(
    resolved_amount: f64,
    paid_installments: u32,
    config: &RateConfiguration,
) -> DebtorBonus {
    let installments = f64::from(paid_installments);
    let per_installment = if paid_installments == 0 {
        0.0
    } else {
        resolved_amount / installments
    };

    let tiers = &config.debtor_tiers;
    let tier = tiers.locate(per_installment);
    let bonus_per_installment = tiers.rate(tier);

    DebtorBonus {
        resolved_amount,
        paid_installments,
        per_installment,
        tier,
        tier_label: tiers.label(tier),
        bonus_per_installment,
        total: bonus_per_installment * installments,
    }
}
