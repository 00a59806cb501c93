use super::{units_times, MethodSubtotals};
use crate::bonus::domain::MethodQuantities;
use crate::bonus::rates::RateConfiguration;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationBonus {
    pub quantities: MethodQuantities,
    pub total_quantity: u64,
    pub subtotals: MethodSubtotals,
    pub total: f64,
}

/// Publications have no goal: each bucket is paid at its own fixed rate.
pub fn calculate_publication(
    quantities: MethodQuantities,
    config: &RateConfiguration,
) -> PublicationBonus {
    let rates = &config.publication;
    let subtotals = MethodSubtotals {
        cash: units_times(quantities.cash, rates.cash),
        installment: units_times(quantities.installment, rates.installment),
        promotional: units_times(quantities.promotional, rates.promotional),
    };

    PublicationBonus {
        quantities,
        total_quantity: quantities.total(),
        total: subtotals.total(),
        subtotals,
    }
}
