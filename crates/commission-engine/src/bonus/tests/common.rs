use chrono::NaiveDate;

use crate::bonus::domain::{PaymentMethod, TransactionKind, TransactionRecord, UserId};
use crate::bonus::rates::{DebtorTierTable, RateConfiguration};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn user(id: &str) -> UserId {
    UserId(id.to_string())
}

/// Rates used in the worked examples: goal 30, base 50, post-goal 100.
pub(super) fn example_config() -> RateConfiguration {
    let mut config = RateConfiguration::default();
    config.goal_quantity = 30;
    config.registration.base = 50.0;
    config.registration.post_goal = 100.0;
    config.registration.promotional = 50.0;
    config.publication.cash = 100.0;
    config.publication.installment = 50.0;
    config.publication.promotional = 40.0;
    config.debtor_tiers = DebtorTierTable::new(
        vec![398.0, 597.0, 999.0, 1500.0],
        vec![10.0, 25.0, 50.0, 75.0, 100.0],
    );
    config
}

pub(super) fn registration(
    user_id: &str,
    on: NaiveDate,
    payment_method: PaymentMethod,
    quantity: u32,
) -> TransactionRecord {
    TransactionRecord {
        user_id: user(user_id),
        date: on,
        kind: TransactionKind::Registration {
            payment_method,
            quantity,
        },
    }
}

pub(super) fn publication(
    user_id: &str,
    on: NaiveDate,
    payment_method: PaymentMethod,
    quantity: u32,
) -> TransactionRecord {
    TransactionRecord {
        user_id: user(user_id),
        date: on,
        kind: TransactionKind::Publication {
            payment_method,
            quantity,
        },
    }
}

pub(super) fn debtor(
    user_id: &str,
    on: NaiveDate,
    resolved_amount: f64,
    paid_installments: u32,
) -> TransactionRecord {
    TransactionRecord {
        user_id: user(user_id),
        date: on,
        kind: TransactionKind::Debtor {
            resolved_amount,
            paid_installments,
        },
    }
}

/// Two sellers across February and March 2025.
pub(super) fn sample_records() -> Vec<TransactionRecord> {
    vec![
        registration("ana", date(2025, 2, 3), PaymentMethod::Cash, 10),
        registration("ana", date(2025, 2, 28), PaymentMethod::Installment, 2),
        registration("ana", date(2025, 3, 1), PaymentMethod::Cash, 20),
        registration("ana", date(2025, 3, 31), PaymentMethod::Cash, 10),
        publication("ana", date(2025, 3, 12), PaymentMethod::Promotional, 1),
        debtor("ana", date(2025, 3, 15), 2000.0, 4),
        registration("bruno", date(2025, 3, 5), PaymentMethod::Cash, 5),
        publication("bruno", date(2025, 3, 6), PaymentMethod::Cash, 10),
        publication("bruno", date(2025, 4, 1), PaymentMethod::Cash, 3),
    ]
}
