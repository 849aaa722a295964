use {serde::Serialize, tokio::sync::broadcast, tracing::trace};

use waygate_transport::DisconnectReason;

/// Default broadcast buffer; slow subscribers past this lag miss events.
pub const EVENT_BUFFER: usize = 256;

/// Lifecycle notifications pushed to external subscribers, keyed per
/// session id.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A pairing artifact is ready to be scanned.
    #[serde(rename = "qr")]
    PairingReady { session_id: String, qr: String },
    /// The session authenticated.
    Connected {
        session_id: String,
        phone: String,
        name: Option<String>,
    },
    /// The session was irreversibly erased.
    Terminated {
        session_id: String,
        reason: DisconnectReason,
    },
}

impl LifecycleEvent {
    pub fn session_id(&self) -> &str {
        match self {
            Self::PairingReady { session_id, .. }
            | Self::Connected { session_id, .. }
            | Self::Terminated { session_id, .. } => session_id,
        }
    }
}

/// Fan-out bus for lifecycle events. Publishing never blocks the state
/// machine; subscribers that lag are skipped by the broadcast channel.
pub struct EventBus {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: LifecycleEvent) {
        // An error only means nobody is subscribed right now.
        if self.tx.send(event).is_err() {
            trace!("lifecycle event dropped: no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }
}
