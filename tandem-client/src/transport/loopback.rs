//! In-process relay for sessions living in the same process.
//!
//! Mirrors what a room relay does for two participants: a second member
//! joining triggers `ready` on the first one, and `data` from one member is
//! delivered verbatim to the other.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::Identity;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::event::{EventSender, SessionEvent};
use crate::traits::TransportChannel;

pub const ROOM_CAPACITY: usize = 2;

#[derive(Clone)]
struct Member {
    username: String,
    events: EventSender,
}

#[derive(Clone, Default)]
pub struct LoopbackRelay {
    rooms: Arc<DashMap<String, Vec<Member>>>,
}

impl LoopbackRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh, unconnected channel attached to this relay.
    pub fn channel(&self) -> LoopbackChannel {
        LoopbackChannel {
            relay: self.clone(),
            events: None,
            identity: None,
        }
    }

    pub fn members(&self, room: &str) -> Vec<String> {
        self.rooms
            .get(room)
            .map(|members| members.iter().map(|m| m.username.clone()).collect())
            .unwrap_or_default()
    }

    /// Register `member` and return the queues of everyone already there.
    fn enter(&self, room: &str, member: Member) -> Result<Vec<EventSender>, TransportError> {
        let mut members = self.rooms.entry(room.to_owned()).or_default();
        members.retain(|m| m.username != member.username);
        if members.len() >= ROOM_CAPACITY {
            return Err(TransportError::RoomFull(room.to_owned()));
        }

        let existing = members.iter().map(|m| m.events.clone()).collect();
        members.push(member);
        Ok(existing)
    }

    fn leave(&self, room: &str, username: &str) {
        let now_empty = match self.rooms.get_mut(room) {
            Some(mut members) => {
                members.retain(|m| m.username != username);
                members.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.rooms.remove_if(room, |_, members| members.is_empty());
            debug!("Room {} is empty, removed", room);
        }
    }

    fn others(&self, room: &str, username: &str) -> Vec<EventSender> {
        self.rooms
            .get(room)
            .map(|members| {
                members
                    .iter()
                    .filter(|m| m.username != username)
                    .map(|m| m.events.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub struct LoopbackChannel {
    relay: LoopbackRelay,
    events: Option<EventSender>,
    identity: Option<Identity>,
}

#[async_trait]
impl TransportChannel for LoopbackChannel {
    async fn connect(&mut self, events: EventSender) -> Result<(), TransportError> {
        if events.try_send(SessionEvent::TransportOpened).is_err() {
            warn!("Session queue unavailable, open notice dropped");
        }
        self.events = Some(events);
        Ok(())
    }

    async fn join(&mut self, identity: &Identity) -> Result<(), TransportError> {
        let events = self.events.clone().ok_or(TransportError::NotConnected)?;

        let existing = self.relay.enter(
            &identity.room,
            Member {
                username: identity.username.clone(),
                events,
            },
        )?;
        self.identity = Some(identity.clone());
        info!("{} joined room {}", identity.username, identity.room);

        for tx in existing {
            deliver(&tx, SessionEvent::PeerReady, &identity.room);
        }
        Ok(())
    }

    async fn send(&mut self, payload: String) -> Result<(), TransportError> {
        if self.events.is_none() {
            return Err(TransportError::NotConnected);
        }
        let identity = self.identity.as_ref().ok_or(TransportError::NotJoined)?;

        let recipients = self.relay.others(&identity.room, &identity.username);
        if recipients.is_empty() {
            warn!("No one else in room {}, payload dropped", identity.room);
        }
        for tx in recipients {
            deliver(&tx, SessionEvent::Signal(payload.clone()), &identity.room);
        }
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(identity) = self.identity.take() {
            self.relay.leave(&identity.room, &identity.username);
            info!("{} left room {}", identity.username, identity.room);
        }
        self.events = None;
    }

    fn is_connected(&self) -> bool {
        self.events.is_some()
    }
}

/// Never waits on a member's queue: a full or closed queue loses the event.
fn deliver(tx: &EventSender, event: SessionEvent, room: &str) {
    let name = event.name();
    match tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!("Room member of {} is backed up, `{}` dropped", room, name);
        }
        Err(TrySendError::Closed(_)) => {
            warn!("Room member of {} is gone, `{}` dropped", room, name);
        }
    }
}
