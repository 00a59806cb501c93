use super::{units_times, MethodSubtotals};
use crate::bonus::domain::MethodQuantities;
use crate::bonus::rates::RateConfiguration;
use serde::Serialize;

const GOAL_MULTIPLIER_LABEL: &str = "2x";
const BASE_MULTIPLIER_LABEL: &str = "1x";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationBonus {
    pub quantities: MethodQuantities,
    pub total_quantity: u64,
    pub goal_quantity: u32,
    pub goal_reached: bool,
    pub missing_for_goal: u32,
    pub multiplier_label: &'static str,
    pub cash_rate: f64,
    pub subtotals: MethodSubtotals,
    pub total: f64,
}

/// Registration bonus. Only cash units count toward the monthly goal; once it
/// is reached every cash unit switches to the post-goal rate. Installment
/// units stay on the base rate and promotional units on their flat rate.
pub fn calculate_registration(
    quantities: MethodQuantities,
    config: &RateConfiguration,
) -> RegistrationBonus {
    let rates = &config.registration;
    let goal_reached = quantities.cash >= config.goal_quantity;
    let cash_rate = if goal_reached {
        rates.post_goal
    } else {
        rates.base
    };

    let subtotals = MethodSubtotals {
        cash: units_times(quantities.cash, cash_rate),
        installment: units_times(quantities.installment, rates.base),
        promotional: units_times(quantities.promotional, rates.promotional),
    };

    RegistrationBonus {
        quantities,
        total_quantity: quantities.total(),
        goal_quantity: config.goal_quantity,
        goal_reached,
        missing_for_goal: config.goal_quantity.saturating_sub(quantities.cash),
        multiplier_label: if goal_reached {
            GOAL_MULTIPLIER_LABEL
        } else {
            BASE_MULTIPLIER_LABEL
        },
        cash_rate,
        total: subtotals.total(),
        subtotals,
    }
}
