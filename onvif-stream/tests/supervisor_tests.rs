//! Lifecycle tests for the connection supervisor, run on a paused clock.


use mock_session::MockSession;
use onvif_stream::{
    ConnectionState, ConnectionSupervisor, DeviceSignal, NormalizedEvent, RawEvent, SessionError,
    SupervisorConfig,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, Instant};

const BACKOFF: Duration = Duration::from_secs(10);
const PROBE: Duration = Duration::from_secs(10);

fn start(
    session: &Arc<MockSession>,
) -> (onvif_stream::SupervisorHandle, UnboundedReceiver<DeviceSignal>) {
    ConnectionSupervisor::spawn("porch", session.clone(), SupervisorConfig::default())
}

async fn next(signals: &mut UnboundedReceiver<DeviceSignal>) -> DeviceSignal {
    signals.recv().await.expect("supervisor stopped unexpectedly")
}

async fn expect_connected(signals: &mut UnboundedReceiver<DeviceSignal>) -> Arc<onvif_stream::DeviceInfo> {
    match next(signals).await {
        DeviceSignal::Connected(info) => info,
        other => panic!("Expected Connected, got {:?}", other),
    }
}

fn motion(value: bool) -> RawEvent {
    RawEvent::new(
        Some("tns1:RuleEngine/CellMotionDetector/Motion".to_string()),
        json!({"message": {"message": {"data": {"simpleItem": {"$": {"Name": "IsMotion", "Value": value}}}}}}),
    )
}

#[tokio::test(start_paused = true)]
async fn test_connect_fails_twice_then_succeeds() {
    let session = Arc::new(MockSession::new());
    session.fail_connects(2);
    let (handle, mut signals) = start(&session);

    let unreachable = SessionError::Connect("device unreachable".to_string());
    assert_eq!(next(&mut signals).await, DeviceSignal::ConnectError(unreachable.clone()));
    assert_eq!(next(&mut signals).await, DeviceSignal::ConnectError(unreachable));
    let info = expect_connected(&mut signals).await;

    assert_eq!(*info, MockSession::info());
    assert_eq!(session.connect_count(), 3);
    assert_eq!(session.info_count(), 1);
    assert_eq!(handle.state(), ConnectionState::Connected);

    let times = session.connect_times();
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= BACKOFF);
    }

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_retries_indefinitely_at_fixed_interval() {
    let session = Arc::new(MockSession::new());
    session.fail_connects(u32::MAX);
    let (handle, mut signals) = start(&session);

    for _ in 0..6 {
        assert!(matches!(next(&mut signals).await, DeviceSignal::ConnectError(_)));
    }

    assert_eq!(session.connect_count(), 6);
    assert_eq!(session.info_count(), 0);
    assert_ne!(handle.state(), ConnectionState::Connected);

    let times = session.connect_times();
    assert_eq!(times.len(), 6);
    for pair in times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= BACKOFF, "attempts only {:?} apart", gap);
    }

    // Still attempting
    assert!(matches!(next(&mut signals).await, DeviceSignal::ConnectError(_)));
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_info_failure_counts_as_connect_failure() {
    let session = Arc::new(MockSession::new());
    session.fail_info(1);
    let (handle, mut signals) = start(&session);

    assert_eq!(
        next(&mut signals).await,
        DeviceSignal::ConnectError(SessionError::Request("not authorized".to_string()))
    );
    expect_connected(&mut signals).await;

    assert_eq!(session.connect_count(), 2);
    assert_eq!(session.info_count(), 2);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_first_probe_one_interval_after_connect() {
    let session = Arc::new(MockSession::new());
    let (handle, mut signals) = start(&session);
    expect_connected(&mut signals).await;

    sleep(PROBE - Duration::from_secs(1)).await;
    assert_eq!(session.probe_count(), 0);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(session.probe_count(), 1);

    sleep(PROBE).await;
    assert_eq!(session.probe_count(), 2);

    // Healthy probes emit nothing
    assert!(matches!(signals.try_recv(), Err(TryRecvError::Empty)));
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_zero_probe_interval_keeps_monitoring() {
    let session = Arc::new(MockSession::new());
    let config = SupervisorConfig::new().with_probe_interval(Duration::ZERO);
    let (handle, mut signals) = ConnectionSupervisor::spawn("porch", session.clone(), config);
    expect_connected(&mut signals).await;

    sleep(Duration::from_secs(1)).await;
    assert!(session.probe_count() >= 5);
    assert_eq!(handle.state(), ConnectionState::Connected);

    session.set_probe_failing(true);
    assert_eq!(next(&mut signals).await, DeviceSignal::Disconnected);
    assert_eq!(handle.state(), ConnectionState::Degraded);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_probe_failure_and_recovery_reuse_cached_info() {
    let session = Arc::new(MockSession::new());
    let (handle, mut signals) = start(&session);
    let first = expect_connected(&mut signals).await;

    session.set_probe_failing(true);
    assert_eq!(next(&mut signals).await, DeviceSignal::Disconnected);
    assert_eq!(handle.state(), ConnectionState::Degraded);

    // Further failures while degraded stay silent
    sleep(PROBE * 3).await;
    assert!(matches!(signals.try_recv(), Err(TryRecvError::Empty)));

    session.set_probe_failing(false);
    let second = expect_connected(&mut signals).await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(handle.state(), ConnectionState::Connected);
    assert_eq!(session.info_count(), 1);
    assert_eq!(session.connect_count(), 1);
    assert_eq!(session.subscribe_count(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_events_normalized_in_order() {
    let session = Arc::new(MockSession::new());
    let (handle, mut signals) = start(&session);
    expect_connected(&mut signals).await;

    session.push_event(motion(true)).await;
    session.push_event(RawEvent::new(None, json!({}))).await;
    session
        .push_event(RawEvent::new(Some("tns1:Tamper".to_string()), json!({"message": {}})))
        .await;
    session.push_event(motion(false)).await;

    assert_eq!(
        next(&mut signals).await,
        DeviceSignal::Event(NormalizedEvent::new("Motion", json!(true)))
    );
    assert_eq!(
        next(&mut signals).await,
        DeviceSignal::Event(NormalizedEvent::new("Motion", json!(false)))
    );

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_probing_continues_after_event_stream_ends() {
    let session = Arc::new(MockSession::new());
    let (handle, mut signals) = start(&session);
    expect_connected(&mut signals).await;

    session.push_event(motion(true)).await;
    assert!(matches!(next(&mut signals).await, DeviceSignal::Event(_)));
    session.close_events();

    session.set_probe_failing(true);
    assert_eq!(next(&mut signals).await, DeviceSignal::Disconnected);
    assert_eq!(session.subscribe_count(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_backoff() {
    let session = Arc::new(MockSession::new());
    session.fail_connects(u32::MAX);
    let (handle, mut signals) = start(&session);

    assert!(matches!(next(&mut signals).await, DeviceSignal::ConnectError(_)));

    let started = Instant::now();
    handle.shutdown().await;
    assert!(started.elapsed() < BACKOFF);

    assert_eq!(signals.recv().await, None);
    assert_eq!(session.connect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_signals_after_shutdown() {
    let session = Arc::new(MockSession::new());
    let (handle, mut signals) = start(&session);
    expect_connected(&mut signals).await;

    session.set_probe_failing(true);
    handle.shutdown().await;

    sleep(PROBE * 2).await;
    assert_eq!(signals.recv().await, None);
    assert_eq!(session.probe_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_task() {
    let session = Arc::new(MockSession::new());
    session.fail_connects(u32::MAX);
    let (handle, mut signals) = start(&session);
    assert!(matches!(next(&mut signals).await, DeviceSignal::ConnectError(_)));

    drop(handle);

    assert_eq!(signals.recv().await, None);
    assert_eq!(session.connect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_state_receiver_observes_transitions() {
    let session = Arc::new(MockSession::new());
    session.fail_connects(1);
    let (handle, mut signals) = start(&session);
    let mut state = handle.state_receiver();

    assert!(matches!(next(&mut signals).await, DeviceSignal::ConnectError(_)));
    assert_eq!(*state.borrow_and_update(), ConnectionState::Disconnected);

    expect_connected(&mut signals).await;
    state
        .wait_for(|s| *s == ConnectionState::Connected)
        .await
        .unwrap();

    handle.shutdown().await;
}
