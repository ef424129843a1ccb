//! Error taxonomy. `InputError` is the only variant surfaced to callers —
//! detector and reviewer failures are swallowed per the fail-soft policy
//! (spec.md §7) and only ever reach `tracing::warn!`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation/resource-limit errors. Every variant is something an
/// external HTTP layer would map to a 400.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum InputError {
    #[error("missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("invalid amount: {0}")]
    BadAmount(String),

    #[error("invalid timestamp: {0}")]
    BadTimestamp(String),

    #[error("invalid account id: {0}")]
    BadId(String),

    #[error("{self_transfers} of {total_rows} rows are self-transfers, exceeding the 50% limit")]
    TooManySelfTransfers {
        self_transfers: usize,
        total_rows: usize,
    },

    #[error("row count {0} exceeds the maximum of {1}")]
    TooManyRows(usize, usize),

    #[error("file size {0} bytes exceeds the maximum of {1} bytes")]
    FileTooLarge(usize, usize),
}

impl InputError {
    /// Stable machine-readable tag, for a caller that wants to build its own
    /// HTTP error body (`{detail: string}` plus a `kind`) without matching
    /// on the `Display` text.
    pub fn kind(&self) -> &'static str {
        match self {
            InputError::MissingColumns(_) => "missing_columns",
            InputError::BadAmount(_) => "bad_amount",
            InputError::BadTimestamp(_) => "bad_timestamp",
            InputError::BadId(_) => "bad_id",
            InputError::TooManySelfTransfers { .. } => "too_many_self_transfers",
            InputError::TooManyRows(..) => "too_many_rows",
            InputError::FileTooLarge(..) => "file_too_large",
        }
    }
}

/// Internal-only: a detector's best-effort failure. Never leaves the crate —
/// every call site degrades this to an empty ring list.
#[derive(Error, Debug)]
pub(crate) enum DetectorError {
    #[error("{0} timed out after {1:?}")]
    Timeout(&'static str, std::time::Duration),

    #[error("{0} panicked: {1}")]
    Panicked(&'static str, String),
}

/// Internal-only: an AI reviewer failure. Never leaves the crate — the
/// caller always gets the unmodified account list back.
#[derive(Error, Debug)]
pub(crate) enum ReviewerError {
    #[error("no API key configured")]
    NoApiKey,

    #[error("request failed: {0}")]
    Request(String),

    #[error("response was not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response failed schema validation")]
    InvalidSchema,
}
