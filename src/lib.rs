//! # Mule Ring Engine
//!
//! A graph-pattern engine for detecting money-muling fraud rings in batch
//! bank-transfer logs.
//!
//! Given a validated transaction table, the engine builds a directed
//! transaction graph and runs three structural detectors concurrently:
//!
//! - **CycleDetector** — closed cycles of fund routing (length 3-5).
//! - **SmurfingDetector** — fan-in/fan-out hubs with a temporally
//!   concentrated burst of distinct counterparties.
//! - **ShellDetector** — layered chains of low-activity pass-through
//!   accounts.
//!
//! Detector output is fused into a deduplicated set of fraud rings with
//! risk scores, and per-account suspicion scores with role-aware pattern
//! keys. An optional AI reviewer stage adjudicates borderline smurfing
//! hubs, filtering merchant false positives out of the result.
//!
//! ## Entry points
//!
//! [`analyze`] runs the full pipeline over already-validated
//! [`RawTransactionRecord`]s. [`analyze_csv`] additionally parses CSV bytes
//! via the [`io`] convenience module (not itself part of the core engine).

pub mod ai_reviewer;
pub mod config;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod graph;
pub mod io;
pub mod model;
pub mod validator;

pub use config::{AiReviewerConfig, AnalysisConfig};
pub use error::InputError;
pub use model::{AnalysisReport, FraudRing, PatternType, SuspiciousAccount, Transaction};
pub use validator::RawTransactionRecord;

/// Runs the full detection pipeline over already-coerced raw records.
pub async fn analyze(
    records: &[RawTransactionRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisReport, InputError> {
    engine::analyze(records, config).await
}

/// Parses `csv_bytes` and runs the full detection pipeline over the
/// result. A thin convenience wrapper around [`io::parse_csv`] +
/// [`analyze`] for callers that don't need their own ingestion layer.
pub async fn analyze_csv(csv_bytes: &[u8], config: &AnalysisConfig) -> Result<AnalysisReport, InputError> {
    let records = io::parse_csv(csv_bytes)?;
    analyze(&records, config).await
}
