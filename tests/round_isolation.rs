//! One account's failures and panics must not leak into the rest of the run.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use reward_harvester::config::schema::ScheduleConfig;
use reward_harvester::console::SilentConsole;
use reward_harvester::lifecycle::Shutdown;
use reward_harvester::orchestrator::{AccountOutcome, Pacer};
use reward_harvester::services::ActionOutcome;

const CLAIMED: &str = r#"{"msg":"Claimed! Txhash: 0xABC123"}"#;

#[tokio::test]
async fn test_panic_in_one_account_does_not_stop_the_run() {
    let node = FakeNode::new();
    let (url, _) = start_faucet(200, CLAIMED).await;
    let first = account(KEY_0);
    let second = account(KEY_1);
    node.set_balance(first.address(), ether("2"));
    node.set_balance(second.address(), ether("2"));
    node.with(|s| s.panic_on_estimate = Some((first.address(), bridge_config().contract)));

    let summary = orchestrator(node.clone(), &url, vec![first, second.clone()], 2)
        .run()
        .await;

    assert_eq!(summary.rounds_completed, 2);
    assert!(!summary.stopped_by_shutdown);
    assert_eq!(summary.totals.panicked, 2);

    let last = summary.last_round.unwrap();
    assert_eq!(last.round, 2);
    assert!(matches!(
        last.accounts[0].outcome,
        AccountOutcome::Panicked(ref m) if m.contains("injected")
    ));
    match &last.accounts[1].outcome {
        AccountOutcome::Finished(result) => {
            assert!(result.faucet.is_success());
            assert!(result.reward.is_success());
            assert!(result.bridge.is_success());
        }
        other => panic!("second account should finish, got {:?}", other),
    }

    // the second account bridged in both rounds
    let bridged = node.sent_to(bridge_config().contract);
    assert_eq!(bridged.len(), 2);
}

#[tokio::test]
async fn test_faucet_failure_still_runs_reward_and_bridge() {
    let node = FakeNode::new();
    let (url, _) = start_faucet(500, r#"{"error":"busy"}"#).await;
    let signer = account(KEY_0);
    node.set_balance(signer.address(), ether("2"));

    let summary = orchestrator(node.clone(), &url, vec![signer], 1).run().await;

    let round = summary.last_round.unwrap();
    let AccountOutcome::Finished(result) = &round.accounts[0].outcome else {
        panic!("account should finish");
    };
    assert!(matches!(result.faucet, ActionOutcome::Completed(ref o) if !o.is_success()));
    assert!(result.reward.is_success());
    assert!(result.bridge.is_success());
    assert_eq!(summary.totals.failed, 1);
    assert_eq!(summary.totals.succeeded, 2);
}

#[tokio::test]
async fn test_poor_account_skips_without_failing() {
    let node = FakeNode::new();
    let (url, _) = start_faucet(200, CLAIMED).await;
    let signer = account(KEY_0);

    let summary = orchestrator(node.clone(), &url, vec![signer], 1).run().await;

    assert_eq!(summary.totals.skipped, 2);
    assert_eq!(summary.totals.succeeded, 1);
    assert!(node.sent().is_empty());
}

#[tokio::test]
async fn test_accounts_processed_in_order() {
    let node = FakeNode::new();
    let (url, requests) = start_faucet(200, CLAIMED).await;
    let first = account(KEY_0);
    let second = account(KEY_1);

    orchestrator(node, &url, vec![first.clone(), second.clone()], 1)
        .run()
        .await;

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].body.contains(&first.address().to_string()));
    assert!(requests[1].body.contains(&second.address().to_string()));
}

#[tokio::test]
async fn test_wallet_gap_follows_last_wallet() {
    let node = FakeNode::new();
    let (url, _) = start_faucet(200, CLAIMED).await;
    let schedule = ScheduleConfig {
        between_wallets_ms: 300,
        ..ScheduleConfig::immediate(1)
    };
    let pacer = Pacer::new(Arc::new(SilentConsole), None);

    let started = std::time::Instant::now();
    let summary = orchestrator_with(node, &url, vec![account(KEY_0)], schedule, pacer)
        .run()
        .await;

    assert_eq!(summary.rounds_completed, 1);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_shutdown_interrupts_round_wait() {
    let node = FakeNode::new();
    let (url, _) = start_faucet(200, CLAIMED).await;
    let signer = account(KEY_0);
    node.set_balance(signer.address(), ether("2"));

    let shutdown = Shutdown::new();
    let schedule = ScheduleConfig {
        between_rounds_secs: 3600,
        ..ScheduleConfig::immediate(10)
    };
    let pacer = Pacer::new(Arc::new(SilentConsole), Some(shutdown.subscribe()));
    let harvester = orchestrator_with(node.clone(), &url, vec![signer], schedule, pacer);
    let run = tokio::spawn(harvester.run());

    // wait for round 1 to finish both transactions
    while node.sent().len() < 2 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();

    let summary = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run should stop promptly")
        .unwrap();
    assert!(summary.stopped_by_shutdown);
    assert_eq!(summary.rounds_completed, 1);
}
