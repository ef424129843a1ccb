//! Fusion and scoring — §4.6. The pattern-score tables, the ring-risk
//! formula, and `compute_suspicion_score`/`build_ring_id` are grounded in
//! `examples/original_source/backend/main.py`'s `PATTERN_SCORES`,
//! `RING_RISK_BASE`, `compute_suspicion_score`, `compute_ring_risk`, and
//! `build_ring_id` globals/functions.

use std::collections::{HashMap, HashSet};

use crate::model::{FraudRing, PatternType, Ring, SuspiciousAccount};

/// Dedups rings by member set (first occurrence wins, in `cycles, then
/// smurfing, then shells` order), assigns sequential `RING_NNN` ids,
/// scores each ring, and builds the per-account suspicion list.
pub fn fuse(cycle_rings: Vec<Ring>, smurfing_rings: Vec<Ring>, shell_rings: Vec<Ring>) -> (Vec<FraudRing>, Vec<SuspiciousAccount>) {
    let mut seen_member_sets: HashSet<Vec<String>> = HashSet::new();
    let mut deduped: Vec<Ring> = Vec::new();

    for ring in cycle_rings.into_iter().chain(smurfing_rings).chain(shell_rings) {
        let mut key: Vec<String> = ring.members.clone();
        key.sort_unstable();
        key.dedup();
        if seen_member_sets.insert(key) {
            deduped.push(ring);
        }
    }

    let mut fraud_rings = Vec::with_capacity(deduped.len());
    let mut accounts: HashMap<String, AccountAccumulator> = HashMap::new();

    for (index, ring) in deduped.iter().enumerate() {
        let ring_id = build_ring_id(index);
        let risk_score = compute_ring_risk(ring.pattern_type, ring.temporal);

        for member in &ring.members {
            let key = role_aware_pattern_key(ring, member);
            let entry = accounts.entry(member.clone()).or_insert_with(|| AccountAccumulator::new(member.clone()));
            entry.add_pattern(key);
            entry.add_ring(&ring_id);
        }

        fraud_rings.push(FraudRing {
            ring_id,
            member_accounts: ring.members.clone(),
            pattern_type: ring.pattern_type,
            risk_score,
        });
    }

    let mut suspicious_accounts: Vec<SuspiciousAccount> = accounts.into_values().map(|a| a.finish()).collect();
    suspicious_accounts.sort_by(|a, b| {
        b.suspicion_score
            .partial_cmp(&a.suspicion_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });

    (fraud_rings, suspicious_accounts)
}

struct AccountAccumulator {
    account_id: String,
    detected_patterns: Vec<String>,
    ring_ids: Vec<String>,
}

impl AccountAccumulator {
    fn new(account_id: String) -> Self {
        Self {
            account_id,
            detected_patterns: Vec::new(),
            ring_ids: Vec::new(),
        }
    }

    fn add_pattern(&mut self, key: String) {
        if !self.detected_patterns.contains(&key) {
            self.detected_patterns.push(key);
        }
    }

    fn add_ring(&mut self, ring_id: &str) {
        if !self.ring_ids.iter().any(|r| r == ring_id) {
            self.ring_ids.push(ring_id.to_string());
        }
    }

    fn finish(self) -> SuspiciousAccount {
        let suspicion_score = compute_suspicion_score(&self.detected_patterns);
        SuspiciousAccount {
            account_id: self.account_id,
            suspicion_score,
            detected_patterns: self.detected_patterns,
            ring_id: self.ring_ids.first().cloned().unwrap_or_default(),
            all_ring_ids: self.ring_ids,
            ai_note: None,
        }
    }
}

pub fn build_ring_id(index: usize) -> String {
    format!("RING_{:03}", index + 1)
}

/// Per-`pattern_type` base risk, +5 if temporal (capped 100), rounded to
/// one decimal.
pub fn compute_ring_risk(pattern_type: PatternType, temporal: bool) -> f64 {
    let base = match pattern_type {
        PatternType::CycleLength3 => 95.0,
        PatternType::CycleLength4 => 92.0,
        PatternType::CycleLength5 => 90.0,
        PatternType::SmurfingFanIn => 85.0,
        PatternType::SmurfingFanOut => 85.0,
        PatternType::LayeredShellNetwork => 75.0,
    };
    let score = if temporal { (base + 5.0).min(100.0) } else { base };
    round1(score)
}

fn role_aware_pattern_key(ring: &Ring, account: &str) -> String {
    match ring.pattern_type {
        PatternType::SmurfingFanIn | PatternType::SmurfingFanOut => {
            let base = if ring.pattern_type == PatternType::SmurfingFanIn {
                "fan_in"
            } else {
                "fan_out"
            };
            let role = if ring.hub.as_deref() == Some(account) { "hub" } else { "leaf" };
            let suffix = if ring.temporal { "_temporal" } else { "" };
            format!("{base}_{role}{suffix}")
        }
        _ => ring.pattern_key.clone(),
    }
}

/// `suspicion = min(100, max(P) + min(10, 5*(|P|-1)))`, rounded to one
/// decimal. `P` is the account's set of role-aware pattern keys.
pub fn compute_suspicion_score(patterns: &[String]) -> f64 {
    if patterns.is_empty() {
        return 0.0;
    }
    let max_score = patterns
        .iter()
        .map(|key| pattern_key_score(key))
        .fold(f64::MIN, f64::max);
    let bonus = (5.0 * (patterns.len() as f64 - 1.0)).min(10.0);
    round1((max_score + bonus).min(100.0))
}

fn pattern_key_score(key: &str) -> f64 {
    match key {
        "cycle_length_3" => 95.0,
        "cycle_length_4" => 90.0,
        "cycle_length_5" => 85.0,
        "fan_in_hub_temporal" | "fan_out_hub_temporal" => 95.0,
        "fan_in_hub" | "fan_out_hub" => 85.0,
        "fan_in_temporal" | "fan_out_temporal" => 80.0,
        "fan_in_leaf_temporal" | "fan_out_leaf_temporal" => 80.0,
        "fan_in" | "fan_out" | "fan_in_leaf" | "fan_out_leaf" => 70.0,
        "layered_shell_network" => 75.0,
        _ => 50.0,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(members: &[&str], pattern_type: PatternType, pattern_key: &str, hub: Option<&str>, temporal: bool) -> Ring {
        Ring {
            members: members.iter().map(|s| s.to_string()).collect(),
            pattern_type,
            pattern_key: pattern_key.to_string(),
            hub: hub.map(|h| h.to_string()),
            temporal,
        }
    }

    #[test]
    fn triangle_scores_95() {
        let cycle = ring(&["A", "B", "C"], PatternType::CycleLength3, "cycle_length_3", None, false);
        let (rings, accounts) = fuse(vec![cycle], vec![], vec![]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].ring_id, "RING_001");
        assert_eq!(rings[0].risk_score, 95.0);
        assert_eq!(accounts.len(), 3);
        assert!(accounts.iter().all(|a| a.suspicion_score == 95.0));
    }

    #[test]
    fn fan_in_hub_and_leaf_scores() {
        let members: Vec<&str> = vec!["S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8", "S9", "S10", "R"];
        let fan_in = ring(&members, PatternType::SmurfingFanIn, "fan_in_temporal", Some("R"), true);
        let (rings, accounts) = fuse(vec![], vec![fan_in], vec![]);
        assert_eq!(rings[0].risk_score, 90.0);
        let hub = accounts.iter().find(|a| a.account_id == "R").unwrap();
        assert_eq!(hub.suspicion_score, 95.0);
        assert_eq!(hub.detected_patterns, vec!["fan_in_hub_temporal"]);
        let leaf = accounts.iter().find(|a| a.account_id == "S1").unwrap();
        assert_eq!(leaf.suspicion_score, 80.0);
        assert_eq!(leaf.detected_patterns, vec!["fan_in_leaf_temporal"]);
    }

    #[test]
    fn dedups_by_member_set_preferring_cycles_over_smurfing() {
        let cycle = ring(&["A", "B", "C"], PatternType::CycleLength3, "cycle_length_3", None, false);
        let fan_in = ring(&["A", "B", "C"], PatternType::SmurfingFanIn, "fan_in_temporal", Some("C"), true);
        let (rings, _) = fuse(vec![cycle], vec![fan_in], vec![]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].pattern_type, PatternType::CycleLength3);
    }

    #[test]
    fn extra_pattern_adds_bonus_capped_at_ten() {
        let a = compute_suspicion_score(&["cycle_length_3".to_string(), "layered_shell_network".to_string()]);
        // max 95 + min(10, 5*1) = 100
        assert_eq!(a, 100.0);
    }
}
