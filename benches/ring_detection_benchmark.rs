//! Benchmarks for the cycle and smurfing detector hot paths, the two
//! detectors §2's implementation budget weights most heavily (15% and
//! 25% respectively).

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mule_ring_engine::config::AnalysisConfig;
use mule_ring_engine::detectors::{cycles, smurfing, CancellationFlag};
use mule_ring_engine::graph::build_graph;
use mule_ring_engine::model::Transaction;

fn tx(s: &str, r: &str, hour: i64) -> Transaction {
    Transaction {
        transaction_id: format!("{s}-{r}-{hour}"),
        sender_id: s.to_string(),
        receiver_id: r.to_string(),
        amount: 10.0,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
    }
}

/// A chain of disjoint 4-node cycles: A0->B0->C0->D0->A0, A1->B1->..., which
/// exercises the full candidate filter and canonical-rotation dedup at
/// scale without any single node becoming a high-degree hub.
fn cycle_heavy_transactions(cycle_count: usize) -> Vec<Transaction> {
    let mut txs = Vec::with_capacity(cycle_count * 4);
    for i in 0..cycle_count {
        let a = format!("A{i}");
        let b = format!("B{i}");
        let c = format!("C{i}");
        let d = format!("D{i}");
        txs.push(tx(&a, &b, 0));
        txs.push(tx(&b, &c, 1));
        txs.push(tx(&c, &d, 2));
        txs.push(tx(&d, &a, 3));
    }
    txs
}

/// `hub_count` independent fan-in hubs, each with 15 senders bursting
/// within a few hours.
fn smurfing_heavy_transactions(hub_count: usize) -> Vec<Transaction> {
    let mut txs = Vec::with_capacity(hub_count * 15);
    for h in 0..hub_count {
        let hub = format!("HUB{h}");
        for s in 0..15 {
            txs.push(tx(&format!("S{h}_{s}"), &hub, s as i64));
        }
    }
    txs
}

fn bench_cycle_detector(c: &mut Criterion) {
    let txs = cycle_heavy_transactions(200);
    let graph = build_graph(&txs);
    let config = AnalysisConfig::default();

    c.bench_function("cycle_detector_200_disjoint_4_cycles", |b| {
        b.iter(|| {
            let cancel = CancellationFlag::new();
            black_box(cycles::detect(black_box(&graph), &config, &cancel))
        })
    });
}

fn bench_smurfing_detector(c: &mut Criterion) {
    let txs = smurfing_heavy_transactions(100);
    let graph = build_graph(&txs);
    let config = AnalysisConfig::default();

    c.bench_function("smurfing_detector_100_fan_in_hubs", |b| {
        b.iter(|| {
            let cancel = CancellationFlag::new();
            black_box(smurfing::detect(black_box(&graph), black_box(&txs), &config, &cancel))
        })
    });
}

criterion_group!(benches, bench_cycle_detector, bench_smurfing_detector);
criterion_main!(benches);
