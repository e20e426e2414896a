use tandem_client::{NegotiationStage, Role, SessionError, SessionEvent, SessionState};
use tandem_core::{Identity, IceCandidateInit, SignalingMessage, encode};

use crate::integration::{ROOM, init_tracing, joined_harness, signal};
use crate::utils::PeerScript;

#[tokio::test]
async fn test_orphan_candidate_is_dropped() {
    init_tracing();

    let mut h = joined_harness("alice", PeerScript::default()).await;

    h.session
        .handle_event(signal(
            "bob",
            SignalingMessage::candidate(IceCandidateInit::new("candidate:orphan")),
        ))
        .await
        .expect("orphan candidate must not be fatal");

    assert_eq!(h.session.state(), SessionState::Joined);
    assert_eq!(h.session.role(), Role::Undetermined);
    assert_eq!(h.peer.created(), 0);
}

#[tokio::test]
async fn test_undecodable_payloads_are_dropped() {
    init_tracing();

    let mut h = joined_harness("alice", PeerScript::default()).await;

    let payloads = [
        format!(r#"{{"username":"bob","room":"{ROOM}","data":{{"type":"bye"}}}}"#),
        format!(r#"{{"username":"bob","room":"{ROOM}","data":{{"sdp":"v=0"}}}}"#),
        "not json at all".to_owned(),
    ];
    for payload in payloads {
        h.session
            .handle_event(SessionEvent::Signal(payload))
            .await
            .expect("bad payloads must not be fatal");
    }

    assert_eq!(h.session.state(), SessionState::Joined);
    assert_eq!(h.peer.created(), 0);
    assert!(h.transport.sent_raw().is_empty());

    // The session is still usable afterwards.
    h.session
        .handle_event(SessionEvent::PeerReady)
        .await
        .expect("ready failed");
    assert_eq!(h.transport.sent_kinds(), vec!["offer"]);
}

#[tokio::test]
async fn test_own_messages_are_ignored() {
    init_tracing();

    let mut h = joined_harness("alice", PeerScript::default()).await;

    h.session
        .handle_event(signal("alice", SignalingMessage::offer("echo")))
        .await
        .expect("echo must not be fatal");

    assert_eq!(h.session.role(), Role::Undetermined);
    assert_eq!(h.peer.created(), 0);
}

#[tokio::test]
async fn test_misrouted_messages_are_dropped() {
    init_tracing();

    let mut h = joined_harness("alice", PeerScript::default()).await;

    let stranger = Identity::new("bob", "some-other-room");
    let payload = encode(&stranger, &SignalingMessage::offer("offer-from-bob")).unwrap();
    h.session
        .handle_event(SessionEvent::Signal(payload))
        .await
        .expect("misrouted message must not be fatal");

    assert_eq!(h.session.role(), Role::Undetermined);
    assert_eq!(h.peer.created(), 0);
}

#[tokio::test]
async fn test_offer_while_offering_is_role_conflict() {
    init_tracing();

    let mut h = joined_harness("alice", PeerScript::default()).await;
    h.session
        .handle_event(SessionEvent::PeerReady)
        .await
        .expect("ready failed");

    let err = h
        .session
        .handle_event(signal("bob", SignalingMessage::offer("offer-from-bob")))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::RoleConflict), "got {err:?}");

    assert_eq!(h.session.state(), SessionState::Closed);
    assert!(h.peer.is_closed());
    assert!(h.media.is_stopped());
    assert!(!h.transport.is_connected());
}

#[tokio::test]
async fn test_offer_after_connect_keeps_call() {
    init_tracing();

    let mut h = joined_harness("alice", PeerScript::default()).await;
    h.session
        .handle_event(SessionEvent::PeerReady)
        .await
        .expect("ready failed");
    h.session
        .handle_event(signal("bob", SignalingMessage::answer("answer-from-bob")))
        .await
        .expect("answer failed");
    assert_eq!(h.session.state(), SessionState::Connected);

    h.session
        .handle_event(signal("bob", SignalingMessage::offer("offer-from-bob")))
        .await
        .expect("late offer must not be fatal");

    assert_eq!(h.session.state(), SessionState::Connected);
    assert_eq!(h.session.role(), Role::Offerer);
    assert!(h.session.has_peer_connection());
    assert!(!h.peer.is_closed());
    assert!(h.transport.is_connected());
    assert_eq!(h.transport.sent_kinds(), vec!["offer"]);
}

#[tokio::test]
async fn test_answer_failure_is_fatal() {
    init_tracing();

    let script = PeerScript {
        fail_create_answer: true,
        ..PeerScript::default()
    };
    let mut h = joined_harness("bob", script).await;

    let err = h
        .session
        .handle_event(signal("alice", SignalingMessage::offer("offer-from-alice")))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            SessionError::Negotiation {
                stage: NegotiationStage::CreateAnswer,
                ..
            }
        ),
        "got {err:?}"
    );

    assert_eq!(h.session.state(), SessionState::Closed);
    assert!(h.peer.is_closed());
    assert!(h.media.is_stopped());
    assert!(h.transport.sent_raw().is_empty());
}
