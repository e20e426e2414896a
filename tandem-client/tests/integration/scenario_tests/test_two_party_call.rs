use std::time::Duration;

use tandem_client::transport::LoopbackRelay;
use tandem_client::{Role, Session, SessionConfig, SessionState};
use tokio::time::timeout;

use crate::integration::{ROOM, TestSession, identity, init_tracing};
use crate::utils::{Journal, MockConnector, MockMedia, MockPeerHandle, PeerCall, PeerScript};

fn participant(relay: &LoopbackRelay, name: &str) -> (TestSession, MockPeerHandle) {
    participant_with(relay, name, SessionConfig::default())
}

fn participant_with(
    relay: &LoopbackRelay,
    name: &str,
    config: SessionConfig,
) -> (TestSession, MockPeerHandle) {
    let journal = Journal::new();
    let (media, _) = MockMedia::new(journal.clone());
    let candidate = format!("candidate:{name}-1");
    let script = PeerScript::with_candidates(&[candidate.as_str()]);
    let (connector, peer) = MockConnector::new(name, script, journal);
    let session = Session::new(
        config,
        media,
        connector,
        Box::new(relay.channel()),
    );
    (session, peer)
}

#[tokio::test]
async fn test_two_participants_connect_through_relay() {
    init_tracing();

    let relay = LoopbackRelay::new();
    let (mut alice, alice_peer) = participant(&relay, "alice");
    let (mut bob, bob_peer) = participant(&relay, "bob");

    alice.start(identity("alice")).await.expect("alice start");
    bob.start(identity("bob")).await.expect("bob start");
    assert_eq!(relay.members(ROOM), vec!["alice", "bob"]);

    // Bob's arrival tells alice to offer.
    alice.process_pending().await.expect("alice offer");
    assert_eq!(alice.role(), Role::Offerer);
    assert_eq!(alice.state(), SessionState::Negotiating);

    bob.process_pending().await.expect("bob answer");
    assert_eq!(bob.role(), Role::Answerer);
    assert_eq!(bob.state(), SessionState::Connected);

    alice.process_pending().await.expect("alice apply answer");
    assert_eq!(alice.state(), SessionState::Connected);

    let offers = |peer: &MockPeerHandle| {
        peer.calls()
            .iter()
            .filter(|c| **c == PeerCall::CreateOffer)
            .count()
    };
    assert_eq!(offers(&alice_peer), 1);
    assert_eq!(offers(&bob_peer), 0);

    assert_eq!(alice_peer.applied_candidates(), vec!["candidate:bob-1"]);
    assert_eq!(bob_peer.applied_candidates(), vec!["candidate:alice-1"]);

    alice.stop().await;
    bob.stop().await;
    assert!(relay.members(ROOM).is_empty());
    assert!(alice_peer.is_closed() && bob_peer.is_closed());
}

#[tokio::test]
async fn test_tiny_queues_do_not_block_start() {
    init_tracing();

    let config = SessionConfig {
        event_capacity: 1,
        ..SessionConfig::default()
    };
    let relay = LoopbackRelay::new();
    let (mut alice, _) = participant_with(&relay, "alice", config.clone());
    let (mut bob, _) = participant_with(&relay, "bob", config);

    alice.start(identity("alice")).await.expect("alice start");
    timeout(Duration::from_secs(2), bob.start(identity("bob")))
        .await
        .expect("bob start blocked on alice's queue")
        .expect("bob start");

    assert_eq!(bob.state(), SessionState::Joined);
    assert_eq!(relay.members(ROOM), vec!["alice", "bob"]);
}
