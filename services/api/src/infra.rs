use chrono::NaiveDate;
use commission_engine::bonus::period::parse_month;
use commission_engine::bonus::{
    BonusEngine, RankingPeriod, RateConfiguration, TransactionKind, TransactionRecord,
};
use commission_engine::error::AppError;
use commission_engine::import::SettingsImporter;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) default_settings: Arc<BTreeMap<String, String>>,
}

impl AppState {
    /// Request settings override the server defaults key by key.
    pub(crate) fn engine_for(
        &self,
        overrides: &BTreeMap<String, String>,
    ) -> Result<BonusEngine, AppError> {
        resolve_engine(&self.default_settings, overrides)
    }
}

pub(crate) fn load_default_settings(
    path: Option<&Path>,
) -> Result<BTreeMap<String, String>, AppError> {
    match path {
        Some(path) => Ok(SettingsImporter::from_path(path)?),
        None => Ok(BTreeMap::new()),
    }
}

pub(crate) fn resolve_engine(
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> Result<BonusEngine, AppError> {
    let mut settings = defaults.clone();
    settings.extend(
        overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    let config = RateConfiguration::from_settings(&settings);
    config.validate()?;
    Ok(BonusEngine::new(config))
}

/// Rejects negative or non-finite debtor amounts before they reach the engine.
pub(crate) fn validate_records(records: &[TransactionRecord]) -> Result<(), AppError> {
    for (index, record) in records.iter().enumerate() {
        if let TransactionKind::Debtor {
            resolved_amount, ..
        } = record.kind
        {
            if !resolved_amount.is_finite() || resolved_amount < 0.0 {
                return Err(AppError::invalid_request(format!(
                    "record {index}: resolved_amount must be a non-negative number"
                )));
            }
        }
    }
    Ok(())
}

pub(crate) fn parse_month_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_month(raw).ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM"))
}

pub(crate) fn parse_period_arg(raw: &str) -> Result<RankingPeriod, String> {
    RankingPeriod::parse(raw)
        .ok_or_else(|| format!("unknown period '{raw}' (expected month, quarter or year)"))
}

pub(crate) fn deserialize_month<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_month_arg(&raw).map_err(serde::de::Error::custom)
}

/// Stored settings may hold strings or bare numbers; both become strings so
/// they go through the same lenient parse.
pub(crate) fn deserialize_settings<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((key, text)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

/// `R$ 1.234,56`: decimal comma, thousands dot, symbol prefix.
pub(crate) fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

pub(crate) fn format_percentage(value: f64) -> String {
    format!("{value:.1}%").replace('.', ",")
}
