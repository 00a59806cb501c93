//! CSV import of transaction records and stored rate settings.

mod parser;

use crate::bonus::TransactionRecord;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// Loads transaction records exported by the record store.
///
/// Expected header:
/// `user_id,date,category,payment_method,quantity,resolved_amount,paid_installments`.
pub struct TransactionImporter;

impl TransactionImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<TransactionRecord>, ImportError> {
        parser::parse_transactions(reader)
    }
}

/// Loads `key,value` settings rows as stored by the record store.
pub struct SettingsImporter;

impl SettingsImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, String>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<BTreeMap<String, String>, ImportError> {
        parser::parse_settings(reader)
    }
}
