mod debtor;
mod publication;
mod registration;

pub use debtor::{calculate_debtor, DebtorBonus};
pub use publication::{calculate_publication, PublicationBonus};
pub use registration::{calculate_registration, RegistrationBonus};

use serde::Serialize;

/// Monetary subtotal per payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MethodSubtotals {
    pub cash: f64,
    pub installment: f64,
    pub promotional: f64,
}

impl MethodSubtotals {
    pub fn total(&self) -> f64 {
        self.cash + self.installment + self.promotional
    }
}

fn units_times(quantity: u32, rate: f64) -> f64 {
    f64::from(quantity) * rate
}
