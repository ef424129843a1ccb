//! ShellDetector — §4.5. Grounded in
//! `examples/original_source/backend/detectors/shells.py`'s
//! `detect_shell_networks`: the tx_count/shell/high-volume definitions,
//! the source-node rule, and the DFS continuation condition ("keep
//! exploring while the newly appended node is itself a shell") all come
//! from that file. The explicit maximality/prefix-dropping pass is
//! stricter than the Python reference (which has no such pass) and
//! follows spec.md, which wins where the two disagree.

use std::collections::HashSet;

use crate::config::AnalysisConfig;
use crate::detectors::CancellationFlag;
use crate::graph::Graph;
use crate::model::{PatternType, Ring};

pub fn detect(graph: &Graph, config: &AnalysisConfig, cancel: &CancellationFlag) -> Vec<Ring> {
    let tx_count = |idx: u32| graph.in_degree(idx) + graph.out_degree(idx);
    let is_high_volume = |idx: u32| tx_count(idx) > config.shell_high_volume_threshold;
    let is_shell = |idx: u32| tx_count(idx) <= config.shell_tx_count_threshold;

    let start_nodes: Vec<u32> = graph
        .node_indices()
        .filter(|&idx| graph.in_degree(idx) == 0 && graph.out_degree(idx) > 0 && !is_high_volume(idx))
        .collect();

    let mut candidates: Vec<Vec<u32>> = Vec::new();
    let mut candidate_set: HashSet<Vec<u32>> = HashSet::new();

    'source: for &start in &start_nodes {
        if cancel.is_cancelled() {
            break;
        }
        let mut stack: Vec<Vec<u32>> = vec![vec![start]];

        while let Some(path) = stack.pop() {
            if candidates.len() >= config.shell_max_rings {
                break 'source;
            }
            let last = *path.last().unwrap();
            for &(neighbor, _weight) in graph.successors(last) {
                if path.contains(&neighbor) || is_high_volume(neighbor) {
                    continue;
                }
                let mut new_path = path.clone();
                new_path.push(neighbor);

                if new_path.len() >= config.shell_min_len && interior_all_shell(&new_path, is_shell) {
                    if candidate_set.insert(new_path.clone()) {
                        candidates.push(new_path.clone());
                        if candidates.len() >= config.shell_max_rings {
                            break 'source;
                        }
                    }
                }
                if new_path.len() < config.shell_max_len && is_shell(neighbor) {
                    stack.push(new_path);
                }
            }
        }
    }

    let accepted = drop_non_maximal(&candidates, &candidate_set, config.shell_min_len);

    accepted
        .into_iter()
        .map(|path| {
            let members: Vec<String> = path.iter().map(|&idx| graph.account_id(idx).to_string()).collect();
            Ring {
                pattern_key: format!("shell_chain_{}_hops", path.len() - 1),
                members,
                pattern_type: PatternType::LayeredShellNetwork,
                hub: None,
                temporal: false,
            }
        })
        .collect()
}

fn interior_all_shell(path: &[u32], is_shell: impl Fn(u32) -> bool) -> bool {
    path[1..path.len() - 1].iter().all(|&idx| is_shell(idx))
}

/// Drops any candidate that is a strict prefix of another accepted
/// candidate, via O(1) membership checks of each proper prefix (length
/// `min_len..chain.len()`) against the full candidate set.
fn drop_non_maximal(
    candidates: &[Vec<u32>],
    candidate_set: &HashSet<Vec<u32>>,
    min_len: usize,
) -> Vec<Vec<u32>> {
    let mut to_drop: HashSet<Vec<u32>> = HashSet::new();
    for chain in candidates {
        for len in min_len..chain.len() {
            let prefix = &chain[..len];
            if candidate_set.contains(prefix) {
                to_drop.insert(prefix.to_vec());
            }
        }
    }
    candidates
        .iter()
        .filter(|c| !to_drop.contains(*c))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::model::Transaction;
    use chrono::Utc;

    fn tx(s: &str, r: &str) -> Transaction {
        Transaction {
            transaction_id: format!("{s}-{r}"),
            sender_id: s.to_string(),
            receiver_id: r.to_string(),
            amount: 10.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn finds_shell_chain_and_drops_its_prefix() {
        let graph = build_graph(&[tx("A", "X"), tx("X", "Y"), tx("Y", "Z"), tx("Z", "B")]);
        let config = AnalysisConfig::default();
        let cancel = CancellationFlag::new();
        let rings = detect(&graph, &config, &cancel);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].members, vec!["A", "X", "Y", "Z", "B"]);
        assert_eq!(rings[0].pattern_key, "shell_chain_4_hops");
    }

    #[test]
    fn high_volume_node_breaks_the_chain() {
        let mut txs = vec![tx("A", "X"), tx("X", "Y"), tx("Y", "Z"), tx("Z", "B")];
        for i in 0..60 {
            txs.push(tx("Y", &format!("N{i}")));
        }
        let graph = build_graph(&txs);
        let config = AnalysisConfig::default();
        let cancel = CancellationFlag::new();
        let rings = detect(&graph, &config, &cancel);
        assert!(rings.is_empty());
    }
}
