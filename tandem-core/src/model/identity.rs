use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a session speaks for: a username inside a named room.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct Identity {
    pub username: String,
    pub room: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            room: room.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.room)
    }
}
