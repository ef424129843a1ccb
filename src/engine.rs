//! Pipeline orchestration — §2/§5. Runs the three detectors on a bounded
//! blocking-task pool (`Semaphore` of 3 permits, per-detector timeouts),
//! waits for all three (Fusion's barrier), then optionally hands the
//! result to the AI reviewer. Grounded in
//! `examples/original_source/backend/main.py`'s `/analyze` endpoint:
//! the `ThreadPoolExecutor(max_workers=3)` + per-future `.result(timeout=)`
//! structure is re-expressed here with `tokio::task::spawn_blocking` +
//! `Semaphore` + `tokio::time::timeout`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use tokio::sync::Semaphore;

use crate::ai_reviewer;
use crate::config::AnalysisConfig;
use crate::detectors::{cycles, shells, smurfing, CancellationFlag};
use crate::error::{DetectorError, InputError};
use crate::fusion;
use crate::graph::{self, Graph};
use crate::model::{AnalysisReport, GraphData, GraphEdge, GraphNode, Ring, Summary};
use crate::validator::{self, RawTransactionRecord};

/// Runs the full pipeline: validate, build the graph, run the three
/// detectors concurrently, fuse, and (if configured) run AI review.
pub async fn analyze(
    records: &[RawTransactionRecord],
    config: &AnalysisConfig,
) -> Result<AnalysisReport, InputError> {
    let started = Instant::now();

    let transactions = validator::validate(records, config)?;
    tracing::info!(transaction_count = transactions.len(), "validated transactions");

    let graph = Arc::new(graph::build_graph(&transactions));
    let node_count = graph.node_count();
    tracing::info!(node_count, "built transaction graph");

    let shell_skipped = config.shell_detection_skipped(node_count);
    let semaphore = Arc::new(Semaphore::new(3));
    let cancel = Arc::new(CancellationFlag::new());

    let cycle_timeout = config.cycle_timeout(node_count);
    let smurfing_timeout = config.smurfing_timeout;
    let shell_timeout = config.shell_timeout;

    let cycle_rings = run_detector("cycles", Arc::clone(&graph), Arc::clone(&semaphore), Arc::clone(&cancel), cycle_timeout, {
        let config = config.clone();
        move |graph, cancel| cycles::detect(&graph, &config, &cancel)
    });
    let smurfing_rings = run_smurfing_detector(
        Arc::clone(&graph),
        transactions.clone(),
        Arc::clone(&semaphore),
        Arc::clone(&cancel),
        smurfing_timeout,
        config.clone(),
    );
    let shell_rings = if shell_skipped {
        tracing::warn!(node_count, "graph too large, skipping shell detection");
        Box::pin(async { Vec::new() }) as std::pin::Pin<Box<dyn std::future::Future<Output = Vec<Ring>> + Send>>
    } else {
        Box::pin(run_detector(
            "shells",
            Arc::clone(&graph),
            Arc::clone(&semaphore),
            Arc::clone(&cancel),
            shell_timeout,
            {
                let config = config.clone();
                move |graph, cancel| shells::detect(&graph, &config, &cancel)
            },
        ))
    };

    let (cycle_rings, smurfing_rings, shell_rings) = tokio::join!(cycle_rings, smurfing_rings, shell_rings);

    let (fraud_rings, suspicious_accounts) = fusion::fuse(cycle_rings, smurfing_rings, shell_rings);

    let suspicious_accounts = if config.ai_reviewer.enabled() {
        ai_reviewer::review(suspicious_accounts, &graph, &transactions, &config.ai_reviewer).await
    } else {
        suspicious_accounts
    };

    let graph_data = build_graph_data(&graph, &suspicious_accounts, config.graph_visualization_cap);

    let summary = Summary {
        total_accounts_analyzed: node_count,
        suspicious_accounts_flagged: suspicious_accounts.len(),
        fraud_rings_detected: fraud_rings.len(),
        processing_time_seconds: started.elapsed().as_secs_f64(),
        shell_detection_skipped: shell_skipped,
    };

    Ok(AnalysisReport {
        suspicious_accounts,
        fraud_rings,
        summary,
        graph_data,
    })
}

/// Runs a detector closure on the blocking pool, bounded to 3 concurrent
/// workers and subject to `timeout`. A timed-out or panicked detector
/// degrades to an empty ring list, per §5/§7's fail-soft policy.
async fn run_detector<F>(
    name: &'static str,
    graph: Arc<Graph>,
    semaphore: Arc<Semaphore>,
    cancel: Arc<CancellationFlag>,
    timeout: Duration,
    detect: F,
) -> Vec<Ring>
where
    F: FnOnce(Arc<Graph>, Arc<CancellationFlag>) -> Vec<Ring> + Send + 'static,
{
    let permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return Vec::new(),
    };
    let start = Instant::now();

    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        detect(graph, cancel)
    });

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(rings)) => {
            tracing::info!(detector = name, ring_count = rings.len(), elapsed_ms = start.elapsed().as_millis() as u64, "detector finished");
            rings
        }
        Ok(Err(join_error)) => {
            let err = DetectorError::Panicked(name, join_error.to_string());
            tracing::warn!(detector = name, error = %err, "detector task panicked");
            Vec::new()
        }
        Err(_) => {
            let err = DetectorError::Timeout(name, timeout);
            tracing::warn!(detector = name, error = %err, "detector timed out");
            Vec::new()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_smurfing_detector(
    graph: Arc<Graph>,
    transactions: Vec<crate::model::Transaction>,
    semaphore: Arc<Semaphore>,
    cancel: Arc<CancellationFlag>,
    timeout: Duration,
    config: AnalysisConfig,
) -> impl std::future::Future<Output = Vec<Ring>> {
    run_detector("smurfing", graph, semaphore, cancel, timeout, move |graph, cancel| {
        smurfing::detect(&graph, &transactions, &config, &cancel)
    })
}

/// Builds the visualization graph view, downsampled per §5's "explicitly
/// randomized" rule when the node count exceeds `cap`.
fn build_graph_data(graph: &Graph, suspicious_accounts: &[crate::model::SuspiciousAccount], cap: usize) -> GraphData {
    let suspicion_by_id: std::collections::HashMap<&str, f64> = suspicious_accounts
        .iter()
        .map(|a| (a.account_id.as_str(), a.suspicion_score))
        .collect();

    let mut node_indices: Vec<u32> = graph.node_indices().collect();
    let capped = node_indices.len() > cap;
    if capped {
        let mut rng = rand::thread_rng();
        node_indices.shuffle(&mut rng);
        node_indices.truncate(cap);
    }
    let included: std::collections::HashSet<u32> = node_indices.iter().copied().collect();

    let nodes = node_indices
        .iter()
        .map(|&idx| {
            let id = graph.account_id(idx);
            let suspicion_score = suspicion_by_id.get(id).copied().unwrap_or(0.0);
            GraphNode {
                id: id.to_string(),
                suspicious: suspicion_by_id.contains_key(id),
                suspicion_score,
            }
        })
        .collect();

    let mut edges = Vec::new();
    for &idx in &node_indices {
        for &(neighbor, _weight) in graph.successors(idx) {
            if included.contains(&neighbor) {
                edges.push(GraphEdge {
                    source: graph.account_id(idx).to_string(),
                    target: graph.account_id(neighbor).to_string(),
                });
            }
        }
    }

    GraphData {
        nodes,
        edges,
        capped,
        cap_limit: cap,
    }
}
