//! Connection supervisor: probe, reconnect, swap, shutdown.

use alloy::primitives::U256;
use std::sync::Arc;
use std::time::Duration;

use ledger_wallet::config::SupervisorConfig;
use ledger_wallet::health::{ConnectionSupervisor, SupervisorCheck};
use ledger_wallet::lifecycle::Shutdown;
use ledger_wallet::RpcSession;

mod common;
use common::{endpoint, fast_rpc, MockConnector, MockNode, NodeState, ONE_ETHER, TEST_ADDRESS};

async fn connect(connector: Arc<MockConnector>) -> Arc<RpcSession> {
    Arc::new(
        RpcSession::connect(endpoint(), connector, fast_rpc())
            .await
            .unwrap(),
    )
}

#[tokio::test]
async fn test_healthy_session_is_left_alone() {
    let connector = MockConnector::with_nodes(vec![MockNode::healthy()]);
    let session = connect(connector.clone()).await;
    let mut supervisor = ConnectionSupervisor::new(session.clone(), &SupervisorConfig::default());

    assert_eq!(supervisor.check_once().await, SupervisorCheck::Healthy);
    assert_eq!(connector.connects(), 1);
    assert_eq!(session.generation(), 1);
}

#[tokio::test]
async fn test_dead_session_is_replaced() {
    let first = MockNode::healthy();
    let second = MockNode::new(NodeState {
        balance: U256::from(3 * ONE_ETHER),
        ..Default::default()
    });
    let connector = MockConnector::with_nodes(vec![first.clone(), second]);
    let session = connect(connector.clone()).await;
    let mut supervisor = ConnectionSupervisor::with_interval(session.clone(), Duration::from_secs(30));

    first.set_alive(false);
    assert_eq!(
        supervisor.check_once().await,
        SupervisorCheck::Reconnected { generation: 2 }
    );

    // Queries after the swap see the new handle
    assert_eq!(session.generation(), 2);
    assert_eq!(
        session.get_balance(TEST_ADDRESS).await.unwrap(),
        U256::from(3 * ONE_ETHER)
    );
}

#[tokio::test]
async fn test_reconnect_failures_are_counted_then_reset() {
    let node = MockNode::healthy();
    let connector = MockConnector::with_nodes(vec![node.clone()]);
    let session = connect(connector.clone()).await;
    let mut supervisor = ConnectionSupervisor::with_interval(session.clone(), Duration::from_secs(30));

    node.set_alive(false);
    assert_eq!(
        supervisor.check_once().await,
        SupervisorCheck::ReconnectFailed { consecutive_failures: 1 }
    );
    assert_eq!(
        supervisor.check_once().await,
        SupervisorCheck::ReconnectFailed { consecutive_failures: 2 }
    );
    assert_eq!(session.generation(), 1);

    node.set_alive(true);
    assert_eq!(supervisor.check_once().await, SupervisorCheck::Healthy);
    assert_eq!(supervisor.consecutive_failures(), 0);
}

#[tokio::test]
async fn test_background_loop_reconnects_and_stops() {
    let first = MockNode::healthy();
    let second = MockNode::healthy();
    let connector = MockConnector::with_nodes(vec![first.clone(), second]);
    let session = connect(connector.clone()).await;

    let shutdown = Shutdown::new();
    let handle = ConnectionSupervisor::with_interval(session.clone(), Duration::from_millis(50))
        .spawn(shutdown.subscribe());

    first.set_alive(false);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(session.generation(), 2);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("supervisor did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_first_check_waits_one_interval() {
    let node = MockNode::healthy();
    let connector = MockConnector::with_nodes(vec![node.clone()]);
    let session = connect(connector).await;

    let shutdown = Shutdown::new();
    let handle = ConnectionSupervisor::with_interval(session, Duration::from_secs(30))
        .spawn(shutdown.subscribe());

    tokio::time::sleep(Duration::from_millis(100)).await;
    // Only the connect probe so far
    assert_eq!(MockNode::count(&node.block_number_calls), 1);

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_interrupts_running_check() {
    let node = MockNode::healthy();
    let connector = MockConnector::with_nodes(vec![node.clone()]);
    let session = connect(connector).await;

    // Probe and reconnect each take their full timeout
    node.update(|s| s.latency = Some(Duration::from_secs(5)));

    let shutdown = Shutdown::new();
    let handle = ConnectionSupervisor::with_interval(session, Duration::from_millis(50))
        .spawn(shutdown.subscribe());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(MockNode::count(&node.block_number_calls) >= 2);

    let started = std::time::Instant::now();
    shutdown.trigger();
    tokio::time::timeout(Duration::from_millis(500), handle)
        .await
        .expect("supervisor waited for the running check")
        .unwrap();
    assert!(started.elapsed() < Duration::from_millis(500));
}
