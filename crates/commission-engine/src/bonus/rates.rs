//! Rate settings consumed by every calculator.
//!
//! Settings arrive from the record store as a flat `key -> string` map. They
//! are coerced into a typed [`RateConfiguration`] once, with a default for
//! every key that is absent or not numeric, and the typed value is passed
//! explicitly from then on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const GOAL_KEY: &str = "meta_registros";
pub const REGISTRATION_BASE_KEY: &str = "registro_valor_base";
pub const REGISTRATION_POST_GOAL_KEY: &str = "registro_valor_pos_meta";
pub const REGISTRATION_PROMOTIONAL_KEY: &str = "registro_valor_promocional";
pub const PUBLICATION_CASH_KEY: &str = "publicacao_valor_avista";
pub const PUBLICATION_INSTALLMENT_KEY: &str = "publicacao_valor_parcelado";
pub const PUBLICATION_PROMOTIONAL_KEY: &str = "publicacao_valor_promocional";

pub const DEFAULT_GOAL_QUANTITY: u32 = 30;
pub const DEFAULT_TIER_BOUNDS: [f64; 5] = [398.0, 597.0, 999.0, 1500.0, 3000.0];
pub const DEFAULT_TIER_RATES: [f64; 6] = [10.0, 25.0, 50.0, 75.0, 100.0, 150.0];

/// Per-unit rates for trademark registrations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRates {
    pub base: f64,
    pub post_goal: f64,
    pub promotional: f64,
}

impl Default for RegistrationRates {
    fn default() -> Self {
        Self {
            base: 50.0,
            post_goal: 100.0,
            promotional: 50.0,
        }
    }
}

/// Per-unit rates for publications, one per payment method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PublicationRates {
    pub cash: f64,
    pub installment: f64,
    pub promotional: f64,
}

impl Default for PublicationRates {
    fn default() -> Self {
        Self {
            cash: 100.0,
            installment: 50.0,
            promotional: 50.0,
        }
    }
}

/// Ordered debtor tiers: `bounds[i]` is the inclusive upper bound of tier `i`
/// and the tier after the last bound is open ended, so `rates` holds one entry
/// more than `bounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtorTierTable {
    bounds: Vec<f64>,
    rates: Vec<f64>,
}

impl DebtorTierTable {
    pub fn new(bounds: Vec<f64>, rates: Vec<f64>) -> Self {
        Self { bounds, rates }
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Index of the tier holding `value`. Always resolves: anything above the
    /// last bound lands in the top tier.
    pub fn locate(&self, value: f64) -> usize {
        let index = self
            .bounds
            .iter()
            .position(|bound| value <= *bound)
            .unwrap_or(self.bounds.len());
        index.min(self.rates.len().saturating_sub(1))
    }

    pub fn rate(&self, tier: usize) -> f64 {
        self.rates
            .get(tier)
            .or_else(|| self.rates.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Human-readable range of a tier, e.g. `399–597` or `3001+`.
    pub fn label(&self, tier: usize) -> String {
        let lower = match tier.checked_sub(1).and_then(|prev| self.bounds.get(prev)) {
            Some(previous) => previous + 1.0,
            None => 0.0,
        };

        match self.bounds.get(tier) {
            Some(upper) => format!("{lower}–{upper}"),
            None => format!("{lower}+"),
        }
    }
}

impl Default for DebtorTierTable {
    fn default() -> Self {
        Self::new(DEFAULT_TIER_BOUNDS.to_vec(), DEFAULT_TIER_RATES.to_vec())
    }
}

/// Immutable snapshot of every threshold and rate the calculators use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateConfiguration {
    pub goal_quantity: u32,
    pub registration: RegistrationRates,
    pub publication: PublicationRates,
    pub debtor_tiers: DebtorTierTable,
}

impl Default for RateConfiguration {
    fn default() -> Self {
        Self {
            goal_quantity: DEFAULT_GOAL_QUANTITY,
            registration: RegistrationRates::default(),
            publication: PublicationRates::default(),
            debtor_tiers: DebtorTierTable::default(),
        }
    }
}

impl RateConfiguration {
    pub fn from_settings(settings: &BTreeMap<String, String>) -> Self {
        let reader = SettingsReader { settings };
        let defaults = Self::default();

        let goal = reader.number(GOAL_KEY, f64::from(defaults.goal_quantity));
        // float to int casts saturate, so negative goals become 0 and fail validation
        let goal_quantity = goal.floor() as u32;

        let registration = RegistrationRates {
            base: reader.number(REGISTRATION_BASE_KEY, defaults.registration.base),
            post_goal: reader.number(REGISTRATION_POST_GOAL_KEY, defaults.registration.post_goal),
            promotional: reader.number(
                REGISTRATION_PROMOTIONAL_KEY,
                defaults.registration.promotional,
            ),
        };

        let publication = PublicationRates {
            cash: reader.number(PUBLICATION_CASH_KEY, defaults.publication.cash),
            installment: reader.number(
                PUBLICATION_INSTALLMENT_KEY,
                defaults.publication.installment,
            ),
            promotional: reader.number(
                PUBLICATION_PROMOTIONAL_KEY,
                defaults.publication.promotional,
            ),
        };

        let bounds = DEFAULT_TIER_BOUNDS
            .iter()
            .enumerate()
            .map(|(index, default)| reader.number(&tier_bound_key(index), *default))
            .collect();
        let rates = DEFAULT_TIER_RATES
            .iter()
            .enumerate()
            .map(|(index, default)| reader.number(&tier_rate_key(index), *default))
            .collect();

        Self {
            goal_quantity,
            registration,
            publication,
            debtor_tiers: DebtorTierTable::new(bounds, rates),
        }
    }

    /// Flattens the configuration back into the record store's key space.
    pub fn to_settings(&self) -> BTreeMap<String, String> {
        let mut settings = BTreeMap::new();
        settings.insert(GOAL_KEY.to_string(), self.goal_quantity.to_string());
        settings.insert(
            REGISTRATION_BASE_KEY.to_string(),
            self.registration.base.to_string(),
        );
        settings.insert(
            REGISTRATION_POST_GOAL_KEY.to_string(),
            self.registration.post_goal.to_string(),
        );
        settings.insert(
            REGISTRATION_PROMOTIONAL_KEY.to_string(),
            self.registration.promotional.to_string(),
        );
        settings.insert(
            PUBLICATION_CASH_KEY.to_string(),
            self.publication.cash.to_string(),
        );
        settings.insert(
            PUBLICATION_INSTALLMENT_KEY.to_string(),
            self.publication.installment.to_string(),
        );
        settings.insert(
            PUBLICATION_PROMOTIONAL_KEY.to_string(),
            self.publication.promotional.to_string(),
        );
        for (index, bound) in self.debtor_tiers.bounds().iter().enumerate() {
            settings.insert(tier_bound_key(index), bound.to_string());
        }
        for (index, rate) in self.debtor_tiers.rates().iter().enumerate() {
            settings.insert(tier_rate_key(index), rate.to_string());
        }
        settings
    }

    pub fn validate(&self) -> Result<(), RateConfigError> {
        if self.goal_quantity < 1 {
            return Err(RateConfigError::GoalBelowOne);
        }

        let named_rates = [
            (REGISTRATION_BASE_KEY, self.registration.base),
            (REGISTRATION_POST_GOAL_KEY, self.registration.post_goal),
            (REGISTRATION_PROMOTIONAL_KEY, self.registration.promotional),
            (PUBLICATION_CASH_KEY, self.publication.cash),
            (PUBLICATION_INSTALLMENT_KEY, self.publication.installment),
            (PUBLICATION_PROMOTIONAL_KEY, self.publication.promotional),
        ];
        for (name, value) in named_rates {
            if value < 0.0 {
                return Err(RateConfigError::NegativeRate {
                    name: name.to_string(),
                    value,
                });
            }
        }

        let tiers = &self.debtor_tiers;
        if tiers.rates().len() != tiers.bounds().len() + 1 {
            return Err(RateConfigError::TierRateCount {
                bounds: tiers.bounds().len(),
                expected: tiers.bounds().len() + 1,
                actual: tiers.rates().len(),
            });
        }

        for (index, value) in tiers.rates().iter().enumerate() {
            if *value < 0.0 {
                return Err(RateConfigError::NegativeRate {
                    name: tier_rate_key(index),
                    value: *value,
                });
            }
        }

        for pair in tiers.bounds().windows(2) {
            if pair[1] <= pair[0] {
                return Err(RateConfigError::TierBoundsNotIncreasing {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }

        Ok(())
    }
}

/// Structural problems detected by [`RateConfiguration::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateConfigError {
    #[error("goal quantity must be at least 1")]
    GoalBelowOne,
    #[error("rate '{name}' must not be negative (got {value})")]
    NegativeRate { name: String, value: f64 },
    #[error("debtor tier bounds must be strictly increasing ({previous} followed by {next})")]
    TierBoundsNotIncreasing { previous: f64, next: f64 },
    #[error("{bounds} debtor tier bounds need {expected} rates, got {actual}")]
    TierRateCount {
        bounds: usize,
        expected: usize,
        actual: usize,
    },
}

pub fn tier_bound_key(index: usize) -> String {
    format!("faixa_{index}_max")
}

pub fn tier_rate_key(index: usize) -> String {
    format!("faixa_{index}_valor")
}

/// Lenient numeric parse used for stored settings and imported amounts.
/// Accepts one decimal comma (`"50,5"`); rejects blanks and non-finite values.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replacen(',', ".", 1)
    } else {
        trimmed.to_string()
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

struct SettingsReader<'a> {
    settings: &'a BTreeMap<String, String>,
}

impl SettingsReader<'_> {
    fn number(&self, key: &str, default: f64) -> f64 {
        match self.settings.get(key) {
            None => {
                debug!(key, default, "setting absent, using default");
                default
            }
            Some(raw) => parse_number(raw).unwrap_or_else(|| {
                warn!(key, value = %raw, default, "setting is not numeric, using default");
                default
            }),
        }
    }
}
