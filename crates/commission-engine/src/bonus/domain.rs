use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the employee who logged a transaction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Registration,
    Publication,
    Debtor,
}

impl Category {
    pub const fn ordered() -> [Self; 3] {
        [Self::Registration, Self::Publication, Self::Debtor]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Registration => "Trademark Registration",
            Self::Publication => "Publication",
            Self::Debtor => "Debtor Collection",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "registration" | "registro" | "registros" => Some(Self::Registration),
            "publication" | "publicacao" | "publicação" | "publicacoes" => Some(Self::Publication),
            "debtor" | "devedor" | "devedores" => Some(Self::Debtor),
            _ => None,
        }
    }
}

/// How the customer paid for a registration or publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[serde(alias = "upfront", alias = "a_vista")]
    Cash,
    #[serde(alias = "parcelado")]
    Installment,
    #[serde(alias = "custom", alias = "promocional")]
    Promotional,
}

impl PaymentMethod {
    pub const fn ordered() -> [Self; 3] {
        [Self::Cash, Self::Installment, Self::Promotional]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Installment => "Installment",
            Self::Promotional => "Promotional",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_token(raw).as_str() {
            "cash" | "upfront" | "a_vista" | "avista" | "à_vista" => Some(Self::Cash),
            "installment" | "installments" | "parcelado" => Some(Self::Installment),
            "promotional" | "promo" | "custom" | "promocional" | "personalizado" => {
                Some(Self::Promotional)
            }
            _ => None,
        }
    }
}

fn normalize_token(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|ch| if ch == ' ' || ch == '-' { '_' } else { ch })
        .collect()
}

/// Category-specific payload of a logged transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum TransactionKind {
    #[serde(alias = "registro")]
    Registration {
        payment_method: PaymentMethod,
        quantity: u32,
    },
    #[serde(alias = "publicacao")]
    Publication {
        payment_method: PaymentMethod,
        quantity: u32,
    },
    #[serde(alias = "devedor")]
    Debtor {
        resolved_amount: f64,
        paid_installments: u32,
    },
}

impl TransactionKind {
    pub const fn category(&self) -> Category {
        match self {
            Self::Registration { .. } => Category::Registration,
            Self::Publication { .. } => Category::Publication,
            Self::Debtor { .. } => Category::Debtor,
        }
    }
}

/// A dated transaction owned by the persistence layer; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub user_id: UserId,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

impl TransactionRecord {
    pub const fn category(&self) -> Category {
        self.kind.category()
    }
}

/// Unit counts split by payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodQuantities {
    #[serde(default)]
    pub cash: u32,
    #[serde(default)]
    pub installment: u32,
    #[serde(default)]
    pub promotional: u32,
}

impl MethodQuantities {
    pub const fn new(cash: u32, installment: u32, promotional: u32) -> Self {
        Self {
            cash,
            installment,
            promotional,
        }
    }

    pub fn add(&mut self, method: PaymentMethod, quantity: u32) {
        let slot = match method {
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::Installment => &mut self.installment,
            PaymentMethod::Promotional => &mut self.promotional,
        };
        *slot = slot.saturating_add(quantity);
    }

    pub const fn get(&self, method: PaymentMethod) -> u32 {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Installment => self.installment,
            PaymentMethod::Promotional => self.promotional,
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.cash) + u64::from(self.installment) + u64::from(self.promotional)
    }
}
