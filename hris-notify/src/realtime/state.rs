//! Connection lifecycle states.

use serde::Serialize;
use std::fmt;

/// State of the push connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// No identity, or the notifier is stopped.
    #[default]
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// The transport is open.
    Connected,
    /// The transport closed; a reconnect is pending.
    Disconnected,
}

impl ConnectionState {
    /// Whether push frames can currently arrive.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}
