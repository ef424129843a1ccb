//! SmurfingDetector — §4.4. Grounded in
//! `examples/original_source/backend/detectors/smurfing.py`: the OR-based
//! high-volume exclusion, the hub-candidate rule, and the fan-in/fan-out
//! ring emission shape all come from `detect_smurfing`. The sliding-window
//! implementation is re-expressed per design note §9 as a two-pointer
//! rolling-multiset scan over nanosecond timestamps (the Python
//! reference's `np.searchsorted` vectorization, generalized to O(n) per
//! hub after an O(n log n) sort) rather than transliterated.

use std::collections::{HashMap, HashSet};

use crate::config::AnalysisConfig;
use crate::detectors::CancellationFlag;
use crate::graph::Graph;
use crate::model::{PatternType, Ring, Transaction};

/// One incoming or outgoing event against a hub: the counterparty index
/// and the transaction's nanosecond timestamp.
type Event = (u32, i64);

pub fn detect(
    graph: &Graph,
    transactions: &[Transaction],
    config: &AnalysisConfig,
    cancel: &CancellationFlag,
) -> Vec<Ring> {
    let (mut incoming, mut outgoing) = group_by_hub(graph, transactions);
    for events in incoming.values_mut() {
        events.sort_by_key(|&(_, ts)| ts);
    }
    for events in outgoing.values_mut() {
        events.sort_by_key(|&(_, ts)| ts);
    }

    let window_ns = config.smurfing_window.as_nanos() as i64;
    let mut rings = Vec::new();
    let mut seen_member_sets: HashSet<Vec<u32>> = HashSet::new();

    for hub in graph.node_indices() {
        if cancel.is_cancelled() {
            break;
        }
        if is_high_volume(graph, hub, config) {
            continue;
        }

        let in_deg = graph.in_degree(hub);
        let out_deg = graph.out_degree(hub);

        if in_deg >= config.smurfing_min_fan {
            if let Some(events) = incoming.get(&hub) {
                if has_temporal_cluster(events, window_ns, config.smurfing_min_fan) {
                    if let Some(ring) = emit_fan_in(graph, hub, &mut seen_member_sets) {
                        rings.push(ring);
                    }
                }
            }
        }

        if out_deg >= config.smurfing_min_fan && in_deg == 0 {
            if let Some(events) = outgoing.get(&hub) {
                if has_temporal_cluster(events, window_ns, config.smurfing_min_fan) {
                    if let Some(ring) = emit_fan_out(graph, hub, &mut seen_member_sets) {
                        rings.push(ring);
                    }
                }
            }
        }
    }

    rings
}

/// A node is excluded from hub consideration if any of the three
/// merchant/high-volume signatures apply.
fn is_high_volume(graph: &Graph, idx: u32, config: &AnalysisConfig) -> bool {
    let in_deg = graph.in_degree(idx);
    let out_deg = graph.out_degree(idx);

    if in_deg > config.smurfing_high_volume_threshold || out_deg > config.smurfing_high_volume_threshold {
        return true;
    }
    // Rule 2 targets a merchant with a trickle of outgoing activity (refunds,
    // payouts), not a pure accumulator with zero outgoing transactions — a
    // zero-output receiver is exactly the fan-in mule shape this detector
    // exists to find, so out_degree must be strictly positive to exclude.
    if in_deg >= 10 && out_deg >= 1 && out_deg <= 2 {
        return true;
    }
    if in_deg >= config.smurfing_merchant_ratio_in_degree
        && out_deg > 0
        && in_deg / out_deg >= config.smurfing_merchant_ratio
    {
        return true;
    }
    false
}

fn group_by_hub(
    graph: &Graph,
    transactions: &[Transaction],
) -> (HashMap<u32, Vec<Event>>, HashMap<u32, Vec<Event>>) {
    let mut incoming: HashMap<u32, Vec<Event>> = HashMap::new();
    let mut outgoing: HashMap<u32, Vec<Event>> = HashMap::new();
    for tx in transactions {
        let (Some(s), Some(r)) = (graph.index_of(&tx.sender_id), graph.index_of(&tx.receiver_id)) else {
            continue;
        };
        let ts = tx.timestamp_ns();
        incoming.entry(r).or_default().push((s, ts));
        outgoing.entry(s).or_default().push((r, ts));
    }
    (incoming, outgoing)
}

/// True iff some window of `window_ns` over the sorted events contains at
/// least `min_unique` distinct counterparties. Two-pointer scan with a
/// rolling frequency multiset: O(n) given events already sorted by
/// timestamp.
fn has_temporal_cluster(events: &[Event], window_ns: i64, min_unique: usize) -> bool {
    let mut freq: HashMap<u32, usize> = HashMap::new();
    let mut unique_count = 0usize;
    let mut right = 0usize;

    for left in 0..events.len() {
        if right < left {
            right = left;
        }
        let window_end = events[left].1 + window_ns;
        while right < events.len() && events[right].1 <= window_end {
            let entry = freq.entry(events[right].0).or_insert(0);
            *entry += 1;
            if *entry == 1 {
                unique_count += 1;
            }
            right += 1;
        }
        if unique_count >= min_unique {
            return true;
        }
        let id = events[left].0;
        if let Some(count) = freq.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                freq.remove(&id);
                unique_count -= 1;
            }
        }
    }
    false
}

fn emit_fan_in(graph: &Graph, hub: u32, seen: &mut HashSet<Vec<u32>>) -> Option<Ring> {
    let mut predecessors: Vec<u32> = graph.predecessors(hub).iter().map(|&(n, _)| n).collect();
    predecessors.sort_unstable();
    predecessors.dedup();

    let mut key = predecessors.clone();
    key.push(hub);
    key.sort_unstable();
    if !seen.insert(key) {
        return None;
    }

    let mut members: Vec<String> = predecessors.iter().map(|&idx| graph.account_id(idx).to_string()).collect();
    members.push(graph.account_id(hub).to_string());

    Some(Ring {
        members,
        pattern_type: PatternType::SmurfingFanIn,
        pattern_key: "fan_in_temporal".to_string(),
        hub: Some(graph.account_id(hub).to_string()),
        temporal: true,
    })
}

fn emit_fan_out(graph: &Graph, hub: u32, seen: &mut HashSet<Vec<u32>>) -> Option<Ring> {
    let mut successors: Vec<u32> = graph.successors(hub).iter().map(|&(n, _)| n).collect();
    successors.sort_unstable();
    successors.dedup();

    let mut key = successors.clone();
    key.push(hub);
    key.sort_unstable();
    if !seen.insert(key) {
        return None;
    }

    let mut members = vec![graph.account_id(hub).to_string()];
    members.extend(successors.iter().map(|&idx| graph.account_id(idx).to_string()));

    Some(Ring {
        members,
        pattern_type: PatternType::SmurfingFanOut,
        pattern_key: "fan_out_temporal".to_string(),
        hub: Some(graph.account_id(hub).to_string()),
        temporal: true,
    })
}
