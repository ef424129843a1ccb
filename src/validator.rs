//! Input validation: the table-to-`Vec<Transaction>` boundary. Follows the
//! teacher's `TransactionValidator::validate` shape — one function, a
//! sequence of checks, each able to fail fast with a typed error.

use crate::config::AnalysisConfig;
use crate::error::InputError;
use crate::model::Transaction;
use chrono::{NaiveDateTime, TimeZone, Utc};

/// Pre-validation data contract: every field as it arrives off the wire
/// (CSV row or otherwise), before type coercion. This is the boundary the
/// out-of-scope HTTP/CSV layer hands records across.
#[derive(Debug, Clone)]
pub struct RawTransactionRecord {
    pub transaction_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: String,
    pub timestamp: String,
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Validates and coerces raw records into immutable `Transaction`s.
///
/// Checks, in order: row count, per-row amount, per-row timestamp, per-row
/// account id shape, then the aggregate self-transfer ratio. The row-level
/// checks fail on the first bad row rather than collecting every error —
/// matching the teacher's fail-fast validator.
pub fn validate(
    records: &[RawTransactionRecord],
    config: &AnalysisConfig,
) -> Result<Vec<Transaction>, InputError> {
    if records.len() > config.max_rows {
        return Err(InputError::TooManyRows(records.len(), config.max_rows));
    }

    let mut transactions = Vec::with_capacity(records.len());
    let mut self_transfers = 0usize;

    for record in records {
        let amount: f64 = record
            .amount
            .trim()
            .parse()
            .map_err(|_| InputError::BadAmount(record.amount.clone()))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(InputError::BadAmount(record.amount.clone()));
        }

        let naive = NaiveDateTime::parse_from_str(record.timestamp.trim(), TIMESTAMP_FORMAT)
            .map_err(|_| InputError::BadTimestamp(record.timestamp.clone()))?;
        let timestamp = Utc.from_utc_datetime(&naive);

        let sender_id = validate_account_id(&record.sender_id, config)?;
        let receiver_id = validate_account_id(&record.receiver_id, config)?;

        if sender_id == receiver_id {
            self_transfers += 1;
        }

        transactions.push(Transaction {
            transaction_id: record.transaction_id.clone(),
            sender_id,
            receiver_id,
            amount,
            timestamp,
        });
    }

    if !transactions.is_empty() {
        let ratio = self_transfers as f64 / transactions.len() as f64;
        if ratio > config.max_self_transfer_ratio {
            return Err(InputError::TooManySelfTransfers {
                self_transfers,
                total_rows: transactions.len(),
            });
        }
    }

    Ok(transactions)
}

fn validate_account_id(raw: &str, config: &AnalysisConfig) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > config.max_account_id_len {
        return Err(InputError::BadId(raw.to_string()));
    }
    Ok(trimmed.to_string())
}
