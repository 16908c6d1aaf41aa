//! Batch ingestion: decodes a delimited transfer file into typed records.
//!
//! Every row is validated up front. The first malformed row fails the whole
//! batch, so scoring never sees a partial batch.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::core::Transaction;
use crate::core::tx::{parse_amount, parse_timestamp, parse_wallet_age};

/// Header columns every batch must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "tx_id",
    "sender",
    "receiver",
    "amount",
    "timestamp",
    "wallet_age_days",
];

/// Errors that reject a batch. Rows are 1-based and exclude the header.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to open batch file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("Row {row}: missing value for '{field}'")]
    MissingValue { row: usize, field: &'static str },

    #[error("Row {row} (tx {tx_id}): invalid {field} '{value}': {reason}")]
    InvalidField {
        row: usize,
        tx_id: String,
        field: &'static str,
        value: String,
        reason: String,
    },
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Load a batch from a CSV file on disk.
pub fn load_transactions(path: impl AsRef<Path>) -> IngestResult<Vec<Transaction>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let txs = read_transactions(BufReader::new(file))?;
    info!("Loaded {} txs from {}", txs.len(), path.display());
    Ok(txs)
}

/// Decode a batch from any CSV source. Column order is free; extra columns are ignored.
pub fn read_transactions<R: Read>(source: R) -> IngestResult<Vec<Transaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let mut index = [0usize; 6];
    for (slot, column) in index.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or(IngestError::MissingColumn { column })?;
    }

    let mut txs = Vec::new();
    let mut seen = HashSet::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let field = |n: usize| required_field(&record, index[n], n, row);

        let tx_id = field(0)?.to_string();
        let invalid = |n: usize, value: &str, reason: String| IngestError::InvalidField {
            row,
            tx_id: tx_id.clone(),
            field: REQUIRED_COLUMNS[n],
            value: value.to_string(),
            reason,
        };

        let sender = field(1)?.to_string();
        let receiver = field(2)?.to_string();
        let raw_amount = field(3)?;
        let amount = parse_amount(raw_amount).map_err(|reason| invalid(3, raw_amount, reason))?;
        let raw_ts = field(4)?;
        let timestamp = parse_timestamp(raw_ts)
            .ok_or_else(|| invalid(4, raw_ts, "unrecognised date-time format".into()))?;
        let raw_age = field(5)?;
        let wallet_age_days =
            parse_wallet_age(raw_age).map_err(|reason| invalid(5, raw_age, reason))?;

        if !seen.insert(tx_id.clone()) {
            warn!("Row {row}: duplicate tx_id {tx_id}");
        }

        txs.push(Transaction {
            tx_id,
            sender,
            receiver,
            amount,
            timestamp,
            wallet_age_days,
        });
    }
    Ok(txs)
}

fn required_field(
    record: &csv::StringRecord,
    position: usize,
    n: usize,
    row: usize,
) -> IngestResult<&str> {
    match record.get(position) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(IngestError::MissingValue {
            row,
            field: REQUIRED_COLUMNS[n],
        }),
    }
}
