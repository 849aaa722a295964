use serde::{Deserialize, Serialize};

/// Why a connection ended, as reported by the messaging network.
///
/// The variants carry the network's status codes; which of them permit a
/// reconnect attempt is decided by the session layer's retry policy, not
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    /// Authoritative logout by the remote party.
    LoggedOut,
    /// Credential material was rejected as corrupt or invalid.
    BadSession,
    /// Another device session superseded this connection.
    Replaced,
    /// Network-level connection loss.
    ConnectionLost,
    /// The server closed the stream.
    ConnectionClosed,
    /// Service temporarily unavailable.
    ServiceUnavailable,
    /// The server asked for a stream restart.
    RestartRequired,
    /// Any other status code.
    Unknown(u16),
}

impl DisconnectReason {
    pub fn code(self) -> u16 {
        match self {
            Self::BadSession => 400,
            Self::LoggedOut => 401,
            Self::ConnectionLost => 408,
            Self::ConnectionClosed => 428,
            Self::Replaced => 440,
            Self::ServiceUnavailable => 503,
            Self::RestartRequired => 515,
            Self::Unknown(code) => code,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            400 => Self::BadSession,
            401 => Self::LoggedOut,
            408 => Self::ConnectionLost,
            428 => Self::ConnectionClosed,
            440 => Self::Replaced,
            503 => Self::ServiceUnavailable,
            515 => Self::RestartRequired,
            other => Self::Unknown(other),
        }
    }
}

/// Asynchronous notifications a transport client pushes into its session's
/// event queue.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A fresh pairing code is available for the device to scan. May fire
    /// several times before a scan succeeds; the latest code wins.
    PairingCode(String),
    /// Authentication completed; the session is live.
    Connected {
        phone_number: String,
        display_name: Option<String>,
    },
    /// The connection ended.
    Disconnected(DisconnectReason),
    /// Updated credential material that must be persisted.
    CredentialsUpdated(Vec<u8>),
}
