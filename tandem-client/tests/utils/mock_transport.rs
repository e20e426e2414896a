use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tandem_client::{EventSender, TransportChannel, TransportError};
use tandem_core::{Identity, SignalingMessage, decode};

use super::Journal;

#[derive(Default)]
struct TransportState {
    connected: bool,
    connect_calls: usize,
    joined: Option<Identity>,
    sent: Vec<String>,
    events: Option<EventSender>,
}

/// Transport that records what the session does with it.
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
    journal: Journal,
    fail_connect: bool,
}

/// Test-side view of a [`MockTransport`] after it was boxed into a session.
#[derive(Clone)]
pub struct MockTransportHandle {
    state: Arc<Mutex<TransportState>>,
}

impl MockTransport {
    pub fn new(journal: Journal) -> (Self, MockTransportHandle) {
        Self::build(journal, false)
    }

    /// A transport whose relay cannot be reached.
    pub fn unreachable(journal: Journal) -> (Self, MockTransportHandle) {
        Self::build(journal, true)
    }

    fn build(journal: Journal, fail_connect: bool) -> (Self, MockTransportHandle) {
        let state = Arc::new(Mutex::new(TransportState::default()));
        let handle = MockTransportHandle {
            state: state.clone(),
        };
        (
            Self {
                state,
                journal,
                fail_connect,
            },
            handle,
        )
    }
}

#[async_trait]
impl TransportChannel for MockTransport {
    async fn connect(&mut self, events: EventSender) -> Result<(), TransportError> {
        self.journal.record("transport.connect");
        let mut state = self.state.lock().unwrap();
        state.connect_calls += 1;
        if self.fail_connect {
            return Err(TransportError::Backend(anyhow::anyhow!("relay unreachable")));
        }
        state.connected = true;
        state.events = Some(events);
        Ok(())
    }

    async fn join(&mut self, identity: &Identity) -> Result<(), TransportError> {
        self.journal.record("transport.join");
        self.state.lock().unwrap().joined = Some(identity.clone());
        Ok(())
    }

    async fn send(&mut self, payload: String) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        state.sent.push(payload);
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.journal.record("transport.disconnect");
        let mut state = self.state.lock().unwrap();
        state.connected = false;
        state.events = None;
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }
}

impl MockTransportHandle {
    pub fn connect_calls(&self) -> usize {
        self.state.lock().unwrap().connect_calls
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    pub fn joined(&self) -> Option<Identity> {
        self.state.lock().unwrap().joined.clone()
    }

    pub fn sent_raw(&self) -> Vec<String> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Every payload the session emitted, decoded.
    pub fn sent(&self) -> Vec<SignalingMessage> {
        self.sent_raw()
            .iter()
            .map(|payload| decode(payload).expect("session emitted an undecodable payload"))
            .collect()
    }

    pub fn sent_kinds(&self) -> Vec<&'static str> {
        self.sent().iter().map(|m| m.kind()).collect()
    }
}
