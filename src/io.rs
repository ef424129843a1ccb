//! CSV ingestion convenience. Not part of the core detection engine — the
//! HTTP/upload layer is explicitly out of scope — but a library needs a
//! documented way to turn bytes into `RawTransactionRecord`s so it is
//! usable standalone. Grounded in the `csv` crate usage pattern seen in
//! the pack's census-taker pipeline (`csv::ReaderBuilder`).

use crate::error::InputError;
use crate::validator::RawTransactionRecord;

const REQUIRED_COLUMNS: [&str; 5] = [
    "transaction_id",
    "sender_id",
    "receiver_id",
    "amount",
    "timestamp",
];

/// Parses a CSV byte slice into `RawTransactionRecord`s. Checks the header
/// contains (at least) the required columns; extra columns are ignored.
/// Does not enforce row count or file size limits — those are checked in
/// `validator::validate` against `AnalysisConfig`, since they depend on
/// config the caller controls.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawTransactionRecord>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| InputError::MissingColumns(vec![e.to_string()]))?
        .clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|s| s.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(InputError::MissingColumns(missing));
    }

    let idx = |name: &str| headers.iter().position(|h| h == name).unwrap();
    let (ti, si, ri, ai, tsi) = (
        idx("transaction_id"),
        idx("sender_id"),
        idx("receiver_id"),
        idx("amount"),
        idx("timestamp"),
    );

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| InputError::BadId(e.to_string()))?;
        records.push(RawTransactionRecord {
            transaction_id: row.get(ti).unwrap_or_default().to_string(),
            sender_id: row.get(si).unwrap_or_default().to_string(),
            receiver_id: row.get(ri).unwrap_or_default().to_string(),
            amount: row.get(ai).unwrap_or_default().to_string(),
            timestamp: row.get(tsi).unwrap_or_default().to_string(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_csv() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                   t1,A,B,10.5,2024-01-01 00:00:00\n";
        let records = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sender_id, "A");
    }

    #[test]
    fn tolerates_extra_columns() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp,notes\n\
                   t1,A,B,10.5,2024-01-01 00:00:00,ignored\n";
        let records = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn rejects_missing_columns() {
        let csv = "transaction_id,sender_id,amount,timestamp\nt1,A,10,2024-01-01 00:00:00\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), "missing_columns");
    }

    #[test]
    fn parses_csv_read_from_disk() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "transaction_id,sender_id,receiver_id,amount,timestamp").unwrap();
        writeln!(file, "t1,A,B,10.5,2024-01-01 00:00:00").unwrap();
        let bytes = std::fs::read(file.path()).unwrap();
        let records = parse_csv(&bytes).unwrap();
        assert_eq!(records.len(), 1);
    }
}
