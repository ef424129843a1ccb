//! AIReviewer — §4.7. Grounded in
//! `examples/original_source/backend/main.py`'s `build_account_profile` and
//! `groq_review`: the partition rule, the profile fields, the verdict
//! vocabulary, and the cascade-removal semantics all come from that
//! function. Transport is `reqwest` (json + rustls-tls, feature-gated as
//! `ai-review`), grounded in `examples/ConsumrBuzzy-PhantomArbiter`'s
//! dependency declaration for the same crate/feature combination.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::AiReviewerConfig;
use crate::error::ReviewerError;
use crate::graph::Graph;
use crate::model::{SuspiciousAccount, Transaction};

#[derive(Debug, Serialize)]
struct AccountProfile {
    account_id: String,
    in_degree: usize,
    out_degree: usize,
    avg_gap_between_incoming_hrs: f64,
    timing_regularity_cv: f64,
    total_incoming_timespan_hrs: f64,
    amount_mean: f64,
    amount_std: f64,
    one_time_senders_pct: f64,
}

#[derive(Debug, Deserialize)]
struct Verdict {
    account_id: String,
    verdict: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    score_adjustment: Option<f64>,
}

/// Reviews `accounts`, returning a possibly-shrunk, re-sorted list. Never
/// fails outward: any transport/schema problem logs a warning and returns
/// the input unchanged, per §4.7's failure semantics.
pub async fn review(
    accounts: Vec<SuspiciousAccount>,
    graph: &Graph,
    transactions: &[Transaction],
    config: &AiReviewerConfig,
) -> Vec<SuspiciousAccount> {
    if !config.enabled() {
        tracing::debug!("AI reviewer disabled: no API key configured");
        return accounts;
    }

    let (cycles, leaves, to_review) = partition(accounts);
    if to_review.is_empty() {
        return resorted(cycles, leaves, Vec::new(), &HashSet::new());
    }

    let profiles: Vec<AccountProfile> = to_review
        .iter()
        .map(|a| build_profile(&a.account_id, graph, transactions))
        .collect();

    match request_verdicts(&profiles, config).await {
        Ok(verdicts) => {
            let (kept_reviewed, removed_ring_ids) = apply_verdicts(to_review, &verdicts);
            resorted(cycles, leaves, kept_reviewed, &removed_ring_ids)
        }
        Err(err) => {
            tracing::warn!(error = %err, "AI reviewer call failed, returning accounts unchanged");
            resorted(cycles, leaves, to_review, &HashSet::new())
        }
    }
}

fn partition(
    accounts: Vec<SuspiciousAccount>,
) -> (Vec<SuspiciousAccount>, Vec<SuspiciousAccount>, Vec<SuspiciousAccount>) {
    let mut cycles = Vec::new();
    let mut leaves = Vec::new();
    let mut to_review = Vec::new();

    for account in accounts {
        let has_cycle = account.detected_patterns.iter().any(|k| k.contains("cycle"));
        let has_leaf = account.detected_patterns.iter().any(|k| k.contains("leaf"));
        if has_cycle {
            cycles.push(account);
        } else if has_leaf {
            leaves.push(account);
        } else {
            to_review.push(account);
        }
    }
    (cycles, leaves, to_review)
}

fn build_profile(account_id: &str, graph: &Graph, transactions: &[Transaction]) -> AccountProfile {
    let mut sender_counts: HashMap<&str, usize> = HashMap::new();
    for tx in transactions {
        *sender_counts.entry(tx.sender_id.as_str()).or_insert(0) += 1;
    }

    let mut incoming: Vec<&Transaction> = transactions.iter().filter(|tx| tx.receiver_id == account_id).collect();
    incoming.sort_by_key(|tx| tx.timestamp_ns());

    let gaps_hrs: Vec<f64> = incoming
        .windows(2)
        .map(|pair| (pair[1].timestamp_ns() - pair[0].timestamp_ns()) as f64 / 3.6e12)
        .collect();

    let avg_gap = mean(&gaps_hrs);
    let timing_regularity_cv = if gaps_hrs.len() >= 2 && avg_gap > 0.0 {
        sample_stddev(&gaps_hrs, avg_gap) / avg_gap
    } else {
        0.0
    };

    let total_span_hrs = match (incoming.first(), incoming.last()) {
        (Some(first), Some(last)) => (last.timestamp_ns() - first.timestamp_ns()) as f64 / 3.6e12,
        _ => 0.0,
    };

    let amounts: Vec<f64> = incoming.iter().map(|tx| tx.amount).collect();
    let amount_mean = mean(&amounts);
    let amount_std = sample_stddev(&amounts, amount_mean);

    let unique_senders: HashSet<&str> = incoming.iter().map(|tx| tx.sender_id.as_str()).collect();
    let one_time = unique_senders
        .iter()
        .filter(|s| sender_counts.get(*s).copied().unwrap_or(0) == 1)
        .count();
    let one_time_senders_pct = if unique_senders.is_empty() {
        0.0
    } else {
        (one_time as f64 / unique_senders.len() as f64) * 100.0
    };

    let (in_degree, out_degree) = match graph.index_of(account_id) {
        Some(idx) => (graph.in_degree(idx), graph.out_degree(idx)),
        None => (0, 0),
    };

    AccountProfile {
        account_id: account_id.to_string(),
        in_degree,
        out_degree,
        avg_gap_between_incoming_hrs: round_to(avg_gap, 2),
        timing_regularity_cv: round_to(timing_regularity_cv, 4),
        total_incoming_timespan_hrs: round_to(total_span_hrs, 2),
        amount_mean: round_to(amount_mean, 2),
        amount_std: round_to(amount_std, 2),
        one_time_senders_pct,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (ddof=1), matching pandas' `.std()` default.
/// Undefined for fewer than two observations.
fn sample_stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

const SYSTEM_PROMPT: &str = "You are a fraud analyst distinguishing money-mule hub accounts from \
    legitimate merchants in a transaction graph. You will receive behavioral profiles of hub \
    accounts already flagged by structural detectors. For each account, return a verdict: KEEP \
    (leave suspicion score as-is, mule-like), REMOVE (merchant false positive, drop from results), \
    or REDUCE (partially suspicious, lower the score). Low timing_regularity_cv combined with low \
    amount_mean suggests a merchant receiving regular small payments; irregular timing and varied \
    amounts suggest a mule. Leaf accounts are never sent to you. When uncertain, KEEP. Respond with \
    a JSON array of objects: {\"account_id\": string, \"verdict\": \"KEEP\"|\"REMOVE\"|\"REDUCE\", \
    \"reason\": string (optional), \"score_adjustment\": number (optional, default -20 for REDUCE)}.";

#[cfg(feature = "ai-review")]
async fn request_verdicts(
    profiles: &[AccountProfile],
    config: &AiReviewerConfig,
) -> Result<Vec<Verdict>, ReviewerError> {
    let api_key = config.api_key.as_ref().ok_or(ReviewerError::NoApiKey)?;

    let body = serde_json::json!({
        "model": config.model,
        "temperature": config.temperature,
        "response_format": { "type": "json_object" },
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": serde_json::to_string(profiles).unwrap_or_default() },
        ],
    });

    let client = reqwest::Client::new();
    let response = client
        .post(&config.endpoint)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| ReviewerError::Request(e.to_string()))?;

    let payload: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ReviewerError::InvalidJson(e.to_string()))?;

    let content = payload
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| ReviewerError::InvalidJson("missing choices[0].message.content".to_string()))?;

    let parsed: serde_json::Value =
        serde_json::from_str(content).map_err(|e| ReviewerError::InvalidJson(e.to_string()))?;

    let array = unwrap_verdict_array(parsed).ok_or(ReviewerError::InvalidSchema)?;

    serde_json::from_value::<Vec<Verdict>>(array)
        .map_err(|_| ReviewerError::InvalidSchema)
        .and_then(|verdicts| {
            if verdicts
                .iter()
                .all(|v| matches!(v.verdict.as_str(), "KEEP" | "REMOVE" | "REDUCE"))
            {
                Ok(verdicts)
            } else {
                Err(ReviewerError::InvalidSchema)
            }
        })
}

#[cfg(not(feature = "ai-review"))]
async fn request_verdicts(
    _profiles: &[AccountProfile],
    _config: &AiReviewerConfig,
) -> Result<Vec<Verdict>, ReviewerError> {
    Err(ReviewerError::NoApiKey)
}

/// Expected response is a JSON array; if the model wraps it in a
/// single-key object (`{"verdicts": [...]}`), unwrap the value.
fn unwrap_verdict_array(value: serde_json::Value) -> Option<serde_json::Value> {
    match value {
        serde_json::Value::Array(_) => Some(value),
        serde_json::Value::Object(mut map) if map.len() == 1 => {
            let (_, inner) = map.drain().next()?;
            match inner {
                serde_json::Value::Array(_) => Some(inner),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Applies KEEP/REMOVE/REDUCE to the reviewed accounts, returning the
/// surviving subset plus the set of ring ids that lost a hub to REMOVE.
fn apply_verdicts(
    accounts: Vec<SuspiciousAccount>,
    verdicts: &[Verdict],
) -> (Vec<SuspiciousAccount>, HashSet<String>) {
    let by_account: HashMap<&str, &Verdict> = verdicts.iter().map(|v| (v.account_id.as_str(), v)).collect();
    let mut removed_ring_ids = HashSet::new();
    let mut kept = Vec::new();

    for mut account in accounts {
        match by_account.get(account.account_id.as_str()) {
            Some(verdict) if verdict.verdict == "REMOVE" => {
                removed_ring_ids.insert(account.ring_id.clone());
            }
            Some(verdict) if verdict.verdict == "REDUCE" => {
                let adjustment = verdict.score_adjustment.unwrap_or(-20.0);
                account.suspicion_score = (account.suspicion_score + adjustment).max(10.0);
                let note = verdict
                    .reason
                    .clone()
                    .unwrap_or_else(|| "AI reviewer reduced suspicion score".to_string());
                account.ai_note = Some(truncate(&note, 200));
                kept.push(account);
            }
            _ => kept.push(account),
        }
    }
    (kept, removed_ring_ids)
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Drops every account (reviewed or leaf) whose primary ring_id is in
/// `removed_ring_ids`, then recombines cycles ++ leaves ++ reviewed,
/// re-sorted by suspicion descending.
fn resorted(
    cycles: Vec<SuspiciousAccount>,
    leaves: Vec<SuspiciousAccount>,
    reviewed: Vec<SuspiciousAccount>,
    removed_ring_ids: &HashSet<String>,
) -> Vec<SuspiciousAccount> {
    let mut all: Vec<SuspiciousAccount> = cycles
        .into_iter()
        .chain(leaves)
        .chain(reviewed)
        .filter(|a| !removed_ring_ids.contains(&a.ring_id))
        .collect();
    all.sort_by(|a, b| {
        b.suspicion_score
            .partial_cmp(&a.suspicion_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });
    all
}
