use thiserror::Error;

/// Gateway-wide error taxonomy.
///
/// Validation and not-found errors are reported synchronously to the caller.
/// Transient connection errors never appear here — they are absorbed by the
/// per-session retry policy and only observable through status and lifecycle
/// events.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or malformed. Rejected before any
    /// session state is touched.
    #[error("{0}")]
    Validation(String),

    /// No session with this id.
    #[error("session not found: {0}")]
    NotFound(String),

    /// The operation requires a connected session.
    #[error("session {0} is not connected")]
    NotConnected(String),

    /// A send attempt failed after the session was connected. Surfaced
    /// as-is; resending is the caller's responsibility.
    #[error("transport error: {0}")]
    Transport(String),

    /// Outbound media could not be resolved (bad base64, fetch failure).
    #[error("media error: {0}")]
    Media(String),

    /// Credential store failure.
    #[error("credential store error: {0}")]
    Credentials(String),
}

pub type Result<T> = std::result::Result<T, Error>;
