//! Fraud ring detection example
//!
//! This example demonstrates end-to-end money-muling ring detection: a
//! small synthetic transaction log combining a cycle, a smurfing burst,
//! and a shell chain, run through the full engine with AI review
//! disabled (no API key configured).

use mule_ring_engine::{analyze, AnalysisConfig, RawTransactionRecord};

fn record(id: &str, sender: &str, receiver: &str, amount: &str, timestamp: &str) -> RawTransactionRecord {
    RawTransactionRecord {
        transaction_id: id.to_string(),
        sender_id: sender.to_string(),
        receiver_id: receiver.to_string(),
        amount: amount.to_string(),
        timestamp: timestamp.to_string(),
    }
}

#[tokio::main]
async fn main() {
    println!("=== Mule Ring Engine ===\n");

    let mut records = vec![
        // A 3-cycle: A -> B -> C -> A.
        record("t1", "A", "B", "500", "2024-01-01 00:00:00"),
        record("t2", "B", "C", "500", "2024-01-01 01:00:00"),
        record("t3", "C", "A", "500", "2024-01-01 02:00:00"),
        // A shell chain: D -> X -> Y -> Z -> E.
        record("t4", "D", "X", "200", "2024-01-02 00:00:00"),
        record("t5", "X", "Y", "200", "2024-01-02 01:00:00"),
        record("t6", "Y", "Z", "200", "2024-01-02 02:00:00"),
        record("t7", "Z", "E", "200", "2024-01-02 03:00:00"),
    ];

    // A fan-in burst: 10 distinct senders to hub R within 24 hours.
    for i in 0..10 {
        records.push(record(
            &format!("fanin-{i}"),
            &format!("S{i}"),
            "R",
            "100",
            &format!("2024-01-03 {:02}:00:00", i),
        ));
    }

    let config = AnalysisConfig::default();
    let report = analyze(&records, &config).await.expect("analysis should succeed on well-formed input");

    println!("Accounts analyzed: {}", report.summary.total_accounts_analyzed);
    println!("Fraud rings detected: {}", report.summary.fraud_rings_detected);
    println!("Processing time: {:.4}s\n", report.summary.processing_time_seconds);

    for ring in &report.fraud_rings {
        println!(
            "{}  {:<22}  risk={:.1}  members={:?}",
            ring.ring_id, ring.pattern_type, ring.risk_score, ring.member_accounts
        );
    }

    println!();
    for account in &report.suspicious_accounts {
        println!(
            "{:<4}  suspicion={:>5.1}  patterns={:?}  ring={}",
            account.account_id, account.suspicion_score, account.detected_patterns, account.ring_id
        );
    }
}
