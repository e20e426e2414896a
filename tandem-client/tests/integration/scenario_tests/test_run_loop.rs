use std::time::Duration;

use tandem_client::transport::LoopbackRelay;
use tandem_client::{Session, SessionConfig, SessionError, SessionEvent, SessionState};
use tandem_core::SignalingMessage;
use tokio::sync::watch;
use tokio::time::timeout;

use crate::integration::{ROOM, TestSession, identity, init_tracing, joined_harness, signal};
use crate::utils::{Journal, MockConnector, MockMedia, PeerScript};

const WAIT: Duration = Duration::from_secs(5);

fn spawn_run(
    mut session: TestSession,
    shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<(TestSession, Result<(), SessionError>)> {
    tokio::spawn(async move {
        let result = session.run(shutdown).await;
        (session, result)
    })
}

#[tokio::test]
async fn test_run_connects_and_stops_on_shutdown() {
    init_tracing();

    let relay = LoopbackRelay::new();
    let mut sessions = Vec::new();
    for name in ["alice", "bob"] {
        let journal = Journal::new();
        let (media, _) = MockMedia::new(journal.clone());
        let (connector, _) = MockConnector::new(name, PeerScript::default(), journal);
        let mut session = Session::new(
            SessionConfig::default(),
            media,
            connector,
            Box::new(relay.channel()),
        );
        session.start(identity(name)).await.expect("start failed");
        sessions.push(session);
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut statuses = Vec::new();
    let mut handles = Vec::new();
    for session in sessions {
        statuses.push(session.subscribe());
        handles.push(spawn_run(session, shutdown_rx.clone()));
    }

    for status in &mut statuses {
        timeout(WAIT, status.wait_for(|s| s.state == SessionState::Connected))
            .await
            .expect("timed out waiting for connection")
            .expect("status channel closed");
    }

    shutdown_tx.send(true).unwrap();
    for handle in handles {
        let (session, result) = timeout(WAIT, handle)
            .await
            .expect("run did not stop")
            .expect("run task panicked");
        result.expect("run failed");
        assert_eq!(session.state(), SessionState::Closed);
    }
    assert!(relay.members(ROOM).is_empty());
}

#[tokio::test]
async fn test_shutdown_abandons_offer_in_flight() {
    init_tracing();

    let script = PeerScript {
        offer_delay: Some(Duration::from_secs(30)),
        ..PeerScript::default()
    };
    let h = joined_harness("alice", script).await;
    h.session
        .event_sender()
        .send(SessionEvent::PeerReady)
        .await
        .unwrap();

    let mut status = h.session.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = spawn_run(h.session, shutdown_rx);

    timeout(WAIT, status.wait_for(|s| s.state == SessionState::Negotiating))
        .await
        .expect("offer never started")
        .expect("status channel closed");

    shutdown_tx.send(true).unwrap();
    let (session, result) = timeout(WAIT, handle)
        .await
        .expect("shutdown did not cancel the offer")
        .expect("run task panicked");

    result.expect("shutdown is not an error");
    assert_eq!(session.state(), SessionState::Closed);
    assert!(h.transport.sent_raw().is_empty(), "no offer may be sent");
    assert!(h.peer.is_closed());
    assert!(h.media.is_stopped());
    assert!(!h.transport.is_connected());
}

#[tokio::test]
async fn test_fatal_error_ends_run() {
    init_tracing();

    let script = PeerScript {
        fail_create_answer: true,
        ..PeerScript::default()
    };
    let h = joined_harness("bob", script).await;
    h.session
        .event_sender()
        .send(signal("alice", SignalingMessage::offer("offer-from-alice")))
        .await
        .unwrap();

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let (session, result) = timeout(WAIT, spawn_run(h.session, shutdown_rx))
        .await
        .expect("run did not end")
        .expect("run task panicked");

    assert!(matches!(result, Err(SessionError::Negotiation { .. })));
    assert_eq!(session.state(), SessionState::Closed);
    assert!(!h.transport.is_connected());
}

#[tokio::test]
async fn test_dropped_shutdown_sender_stops_run() {
    init_tracing();

    let mut h = joined_harness("alice", PeerScript::default()).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    drop(shutdown_tx);

    timeout(WAIT, h.session.run(shutdown_rx))
        .await
        .expect("run did not stop")
        .expect("run failed");

    assert_eq!(h.session.state(), SessionState::Closed);
    assert!(h.media.is_stopped());
}
