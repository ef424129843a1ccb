//! Core data model: transactions, rings, and the fused output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single validated bank transfer. Immutable once constructed by the
/// validator; never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Nanosecond-resolution timestamp, used on every detector hot path to
    /// avoid repeated `DateTime` comparisons.
    pub fn timestamp_ns(&self) -> i64 {
        self.timestamp.timestamp_nanos_opt().unwrap_or(i64::MIN)
    }
}

/// The six closed pattern families a detector can emit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatternType {
    #[serde(rename = "cycle_length_3")]
    CycleLength3,
    #[serde(rename = "cycle_length_4")]
    CycleLength4,
    #[serde(rename = "cycle_length_5")]
    CycleLength5,
    #[serde(rename = "smurfing_fan_in")]
    SmurfingFanIn,
    #[serde(rename = "smurfing_fan_out")]
    SmurfingFanOut,
    #[serde(rename = "layered_shell_network")]
    LayeredShellNetwork,
}

impl PatternType {
    /// The exact `pattern_type` string spec.md names for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::CycleLength3 => "cycle_length_3",
            PatternType::CycleLength4 => "cycle_length_4",
            PatternType::CycleLength5 => "cycle_length_5",
            PatternType::SmurfingFanIn => "smurfing_fan_in",
            PatternType::SmurfingFanOut => "smurfing_fan_out",
            PatternType::LayeredShellNetwork => "layered_shell_network",
        }
    }

    pub fn cycle_length(len: usize) -> Option<Self> {
        match len {
            3 => Some(PatternType::CycleLength3),
            4 => Some(PatternType::CycleLength4),
            5 => Some(PatternType::CycleLength5),
            _ => None,
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detector's raw finding, before fusion/dedup/scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    pub members: Vec<String>,
    pub pattern_type: PatternType,
    pub pattern_key: String,
    pub hub: Option<String>,
    pub temporal: bool,
}

/// A post-fusion, scored ring as surfaced to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRing {
    pub ring_id: String,
    pub member_accounts: Vec<String>,
    pub pattern_type: PatternType,
    pub risk_score: f64,
}

/// A per-account suspicion record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    pub account_id: String,
    pub suspicion_score: f64,
    pub detected_patterns: Vec<String>,
    pub ring_id: String,
    pub all_ring_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_accounts_analyzed: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub processing_time_seconds: f64,
    pub shell_detection_skipped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub suspicious: bool,
    pub suspicion_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub capped: bool,
    pub cap_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    pub summary: Summary,
    pub graph_data: GraphData,
}
