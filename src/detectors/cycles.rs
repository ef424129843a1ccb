//! CycleDetector — §4.3. Grounded in
//! `examples/original_source/backend/detectors/cycles.py`: the candidate
//! filter, the 300-start-node slice, the 500-ring cap, and the canonical
//! rotate-to-minimum dedup key all come directly from that file's
//! `detect_cycles`. The iterative LIFO-stack DFS is also the Python
//! reference's structure, re-expressed with the Rust-idiomatic recursive
//! variant seen in `polysettle-clearing-engine`'s cycle detector (explicit
//! `HashSet` visited-key dedup, rotation to canonical form).

use std::collections::HashSet;

use crate::config::AnalysisConfig;
use crate::detectors::CancellationFlag;
use crate::graph::Graph;
use crate::model::{PatternType, Ring};

/// Finds all distinct directed cycles of length 3-5, subject to the
/// candidate filter and the start-node/ring/depth bounds in `config`.
pub fn detect(graph: &Graph, config: &AnalysisConfig, cancel: &CancellationFlag) -> Vec<Ring> {
    let candidates = candidate_set(graph, config);
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut start_nodes: Vec<u32> = candidates.iter().copied().collect();
    start_nodes.sort_by(|&a, &b| graph.account_id(a).cmp(graph.account_id(b)));
    start_nodes.truncate(config.cycle_max_start_nodes);

    let mut rings = Vec::new();
    let mut seen_keys: HashSet<Vec<u32>> = HashSet::new();

    'start: for &start in &start_nodes {
        if cancel.is_cancelled() {
            break;
        }
        // Iterative LIFO-stack DFS: frontier holds (path-so-far,
        // next-successor-index-to-try), mirroring the Python reference's
        // explicit stack of (node, path) rather than the call stack.
        let mut stack: Vec<Vec<u32>> = vec![vec![start]];

        while let Some(path) = stack.pop() {
            if rings.len() >= config.cycle_max_cycles {
                break 'start;
            }
            let last = *path.last().unwrap();
            for &(neighbor, _weight) in graph.successors(last) {
                if !candidates.contains(&neighbor) {
                    continue;
                }
                if neighbor == start {
                    if (3..=5).contains(&path.len()) {
                        if let Some(ring) = close_cycle(graph, &path, &mut seen_keys) {
                            rings.push(ring);
                            if rings.len() >= config.cycle_max_cycles {
                                break 'start;
                            }
                        }
                    }
                    continue;
                }
                if path.len() < config.cycle_max_depth && !path.contains(&neighbor) {
                    let mut next = path.clone();
                    next.push(neighbor);
                    stack.push(next);
                }
            }
        }
    }

    rings
}

fn candidate_set(graph: &Graph, config: &AnalysisConfig) -> HashSet<u32> {
    graph
        .node_indices()
        .filter(|&idx| {
            let in_deg = graph.in_degree(idx);
            let out_deg = graph.out_degree(idx);
            in_deg > 0
                && out_deg > 0
                && in_deg <= config.cycle_max_degree
                && out_deg <= config.cycle_max_degree
        })
        .collect()
}

fn close_cycle(graph: &Graph, path: &[u32], seen: &mut HashSet<Vec<u32>>) -> Option<Ring> {
    let rotated = canonical_rotation(graph, path);
    if !seen.insert(rotated.clone()) {
        return None;
    }
    let pattern_type = PatternType::cycle_length(rotated.len())?;
    let members = rotated.iter().map(|&idx| graph.account_id(idx).to_string()).collect();
    Some(Ring {
        members,
        pattern_type,
        pattern_key: pattern_type.as_str().to_string(),
        hub: None,
        temporal: false,
    })
}

/// Rotates `path` so it begins at the member with the lexicographically
/// minimum account ID. This is the dedup key: any rotation of the same
/// cycle produces the same canonical form, regardless of which interned
/// index happens to be numerically smallest.
fn canonical_rotation(graph: &Graph, path: &[u32]) -> Vec<u32> {
    let (min_pos, _) = path
        .iter()
        .enumerate()
        .min_by_key(|&(_, &idx)| graph.account_id(idx))
        .expect("path is non-empty");
    let mut rotated = Vec::with_capacity(path.len());
    rotated.extend_from_slice(&path[min_pos..]);
    rotated.extend_from_slice(&path[..min_pos]);
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use chrono::Utc;

    fn tx(s: &str, r: &str) -> crate::model::Transaction {
        crate::model::Transaction {
            transaction_id: format!("{s}-{r}"),
            sender_id: s.to_string(),
            receiver_id: r.to_string(),
            amount: 10.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn finds_minimal_triangle() {
        let graph = build_graph(&[tx("B", "C"), tx("C", "A"), tx("A", "B")]);
        let config = AnalysisConfig::default();
        let cancel = CancellationFlag::new();
        let rings = detect(&graph, &config, &cancel);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].pattern_type, PatternType::CycleLength3);
        assert_eq!(rings[0].members, vec!["A", "B", "C"]);
    }

    #[test]
    fn canonical_rotation_starts_at_minimum_account_id() {
        // Interning order is B=0, C=1, A=2 (first appearance), so the
        // numerically smallest index (0="B") is NOT the lexicographically
        // smallest account ID ("A") — the rotation must follow the ID, not
        // the interned index.
        let graph = build_graph(&[tx("B", "C"), tx("C", "A"), tx("A", "B")]);
        let b = graph.index_of("B").unwrap();
        let c = graph.index_of("C").unwrap();
        let a = graph.index_of("A").unwrap();
        assert_eq!(canonical_rotation(&graph, &[b, c, a]), vec![a, b, c]);
        assert_eq!(canonical_rotation(&graph, &[a, b, c]), vec![a, b, c]);
    }

    #[test]
    fn excludes_high_degree_hub_from_candidates() {
        // A hub with out-degree 9 exceeds cycle_max_degree (8) and must not
        // be treated as a cycle candidate even if it sits on a 3-cycle.
        let mut txs = vec![tx("HUB", "A"), tx("A", "HUB")];
        for i in 0..8 {
            txs.push(tx("HUB", &format!("X{i}")));
        }
        let graph = build_graph(&txs);
        let config = AnalysisConfig::default();
        let cancel = CancellationFlag::new();
        let rings = detect(&graph, &config, &cancel);
        assert!(rings.is_empty());
    }

    #[test]
    fn no_duplicate_cycle_across_start_nodes() {
        let graph = build_graph(&[tx("A", "B"), tx("B", "C"), tx("C", "A")]);
        let config = AnalysisConfig::default();
        let cancel = CancellationFlag::new();
        let rings = detect(&graph, &config, &cancel);
        assert_eq!(rings.len(), 1);
    }
}
