use super::ImportError;
use crate::bonus::rates::parse_number;
use crate::bonus::{Category, PaymentMethod, TransactionKind, TransactionRecord, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::io::Read;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

pub(crate) fn parse_transactions<R: Read>(
    reader: R,
) -> Result<Vec<TransactionRecord>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map(|position| position.line()).unwrap_or(0);
        let parsed: TransactionRow = row.deserialize(Some(&headers))?;
        let record = parsed
            .into_record()
            .map_err(|reason| ImportError::InvalidRow { line, reason })?;
        records.push(record);
    }

    Ok(records)
}

pub(crate) fn parse_settings<R: Read>(reader: R) -> Result<BTreeMap<String, String>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut settings = BTreeMap::new();

    for row in csv_reader.deserialize::<SettingRow>() {
        let row = row?;
        if row.key.is_empty() {
            continue;
        }
        settings.insert(row.key, row.value);
    }

    Ok(settings)
}

#[derive(Debug, Deserialize)]
struct SettingRow {
    key: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
    user_id: String,
    date: String,
    category: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    payment_method: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    quantity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    resolved_amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    paid_installments: Option<String>,
}

impl TransactionRow {
    fn into_record(self) -> Result<TransactionRecord, String> {
        let user_id = self.user_id.trim();
        if user_id.is_empty() {
            return Err("user_id is required".to_string());
        }

        let date = parse_date(&self.date)
            .ok_or_else(|| format!("date '{}' is not YYYY-MM-DD or DD/MM/YYYY", self.date))?;

        let category = Category::parse(&self.category)
            .ok_or_else(|| format!("unknown category '{}'", self.category))?;

        let kind = match category {
            Category::Registration => TransactionKind::Registration {
                payment_method: self.payment_method()?,
                quantity: required_count(self.quantity.as_deref(), "quantity")?,
            },
            Category::Publication => TransactionKind::Publication {
                payment_method: self.payment_method()?,
                quantity: required_count(self.quantity.as_deref(), "quantity")?,
            },
            Category::Debtor => TransactionKind::Debtor {
                resolved_amount: self.resolved_amount()?,
                paid_installments: required_count(
                    self.paid_installments.as_deref(),
                    "paid_installments",
                )?,
            },
        };

        Ok(TransactionRecord {
            user_id: UserId(user_id.to_string()),
            date,
            kind,
        })
    }

    fn payment_method(&self) -> Result<PaymentMethod, String> {
        let raw = self
            .payment_method
            .as_deref()
            .ok_or_else(|| "payment_method is required for this category".to_string())?;
        PaymentMethod::parse(raw).ok_or_else(|| format!("unknown payment_method '{raw}'"))
    }

    fn resolved_amount(&self) -> Result<f64, String> {
        let raw = self
            .resolved_amount
            .as_deref()
            .ok_or_else(|| "resolved_amount is required for debtor rows".to_string())?;
        let amount = parse_amount(raw)
            .ok_or_else(|| format!("resolved_amount '{raw}' is not a number"))?;
        if amount < 0.0 {
            return Err(format!("resolved_amount must not be negative (got {amount})"));
        }
        Ok(amount)
    }
}

fn required_count(raw: Option<&str>, field: &str) -> Result<u32, String> {
    let raw = raw.ok_or_else(|| format!("{field} is required for this category"))?;
    raw.parse::<u32>()
        .map_err(|_| format!("{field} must be a non-negative integer (got '{raw}')"))
}

/// Amounts may come formatted as `1.500,50`; thousands dots are dropped when
/// a decimal comma is present.
fn parse_amount(raw: &str) -> Option<f64> {
    if raw.contains(',') && raw.contains('.') {
        parse_number(&raw.replace('.', ""))
    } else {
        parse_number(raw)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
