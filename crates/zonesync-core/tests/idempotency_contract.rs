//! Contract Test: Idempotency
//!
//! Applying a run's output and reconciling again against the same zone file
//! must produce no further changes.

mod common;

use common::*;
use zonesync_core::{Record, RecordType, SyncConfig, SyncOutcome, Ttl};

async fn run_twice(remote_records: Vec<Record>, wanted: Vec<Record>, config: SyncConfig) -> MockDnsProvider {
    let provider = MockDnsProvider::new(remote(remote_records));
    let reporter = RecordingReporter::default();

    let first = ScriptedConfirmation::answering(&[true]);
    let outcome = engine(&provider, &first, &reporter, config.clone())
        .run(&desired(wanted.clone()))
        .await
        .unwrap();
    assert!(matches!(outcome, SyncOutcome::Applied(_)));
    provider.clear_calls();

    let second = ScriptedConfirmation::default();
    let outcome = engine(&provider, &second, &reporter, config)
        .run(&desired(wanted))
        .await
        .unwrap();

    assert!(second.prompts().is_empty(), "second run asked: {:?}", second.prompts());
    assert!(matches!(outcome, SyncOutcome::Applied(summary) if summary.total() == 0));
    provider
}

#[tokio::test]
async fn second_run_is_a_no_op() {
    let provider = run_twice(
        vec![
            a("www.example.com", "1.1.1.1", 300),
            a("stale.example.com", "5.5.5.5", 300),
            txt("example.com", "v=spf1 -all", 3600),
        ],
        vec![
            a("www.example.com", "2.2.2.2", 300),
            a("api.example.com", "3.3.3.3", 300),
            txt("example.com", "v=spf1 -all", 3600),
        ],
        SyncConfig::default(),
    )
    .await;

    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn repeated_identity_converges() {
    // Round-robin A records share name and type.
    let provider = run_twice(
        vec![a("rr.example.com", "1.1.1.1", 300)],
        vec![
            a("rr.example.com", "2.2.2.2", 300),
            a("rr.example.com", "3.3.3.3", 300),
            a("rr.example.com", "4.4.4.4", 300),
        ],
        SyncConfig::default(),
    )
    .await;

    let rr: Vec<String> = provider
        .snapshot()
        .into_iter()
        .filter(|r| r.name == "rr.example.com")
        .map(|r| r.content)
        .collect();
    assert_eq!(rr.len(), 3);
    for content in ["2.2.2.2", "3.3.3.3", "4.4.4.4"] {
        assert!(rr.iter().any(|c| c == content));
    }
}

#[tokio::test]
async fn proxied_and_priority_changes_converge() {
    let mx = |priority| {
        Record::new("example.com", RecordType::Mx, "mx.example.net", Ttl::Auto).with_priority(priority)
    };

    run_twice(
        vec![
            Record::new("www.example.com", RecordType::Cname, "example.com", Ttl::Auto),
            mx(20),
        ],
        vec![
            Record::new("www.example.com", RecordType::Cname, "example.com", Ttl::Auto).with_proxied(true),
            mx(10),
        ],
        SyncConfig::default(),
    )
    .await;
}

#[tokio::test]
async fn preserved_records_stay_put_across_runs() {
    let provider = run_twice(
        vec![a("manual.example.com", "7.7.7.7", 300)],
        vec![a("www.example.com", "1.1.1.1", 300)],
        SyncConfig::default().with_preserve_unknown(true),
    )
    .await;

    assert!(provider
        .snapshot()
        .contains(&a("manual.example.com", "7.7.7.7", 300)));
}
