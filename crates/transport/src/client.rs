use std::sync::Arc;

use {anyhow::Result, async_trait::async_trait, tokio::sync::mpsc};

use crate::{
    event::TransportEvent,
    jid::Jid,
    message::{MessageId, OutboundMessage},
};

/// Channel a transport pushes its connection events into. Each session owns
/// exactly one; the session's state machine drains it in arrival order.
pub type EventSink = mpsc::UnboundedSender<TransportEvent>;

/// Optional capabilities a transport connection came up with. A missing
/// capability marks the session as degraded rather than substituting a
/// silent stand-in.
#[derive(Debug, Clone, Copy)]
pub struct TransportCapabilities {
    /// In-memory message archive bound to the connection.
    pub archive: bool,
}

impl Default for TransportCapabilities {
    fn default() -> Self {
        Self { archive: true }
    }
}

/// A live connection to the messaging network, scoped to one session.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Send a message to a recipient. Requires the connection to be
    /// authenticated; failures are surfaced to the caller unretried.
    async fn send_message(&self, to: &Jid, message: OutboundMessage) -> Result<MessageId>;

    /// Request an authoritative logout from the remote network.
    async fn logout(&self) -> Result<()>;

    /// Tear the connection down. After this resolves the client must emit
    /// no further events into its sink.
    async fn shutdown(&self);
}

/// Creates one transport client per connection attempt.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Establish a connection for `session_id`, resuming from `credentials`
    /// when present. Connection-state and pairing events flow into
    /// `events`; the returned client accepts sends once a
    /// [`TransportEvent::Connected`] has been emitted.
    async fn connect(
        &self,
        session_id: &str,
        credentials: Option<Vec<u8>>,
        events: EventSink,
    ) -> Result<(Arc<dyn TransportClient>, TransportCapabilities)>;
}
