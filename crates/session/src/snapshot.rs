use serde::Serialize;

use {waygate_common::SessionIdentity, waygate_transport::DisconnectReason};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Transport is being established.
    Initializing,
    /// A pairing code is waiting to be scanned.
    AwaitingPairing,
    /// Authenticated and able to send.
    Connected,
    /// Waiting out the delay before the next connect attempt.
    Reconnecting,
    /// Absorbing final state; registry entry and credentials are gone.
    Terminated,
}

/// Point-in-time view of one session, taken atomically per entry.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub state: SessionState,
    pub retry_count: u32,
    /// Present iff `state` is `Connected`.
    pub identity: Option<SessionIdentity>,
    /// Retained for diagnostics across reconnects.
    pub last_disconnect: Option<DisconnectReason>,
    /// True when the transport came up without an optional capability.
    pub degraded: bool,
}

impl SessionSnapshot {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            state: SessionState::Initializing,
            retry_count: 0,
            identity: None,
            last_disconnect: None,
            degraded: false,
        }
    }
}
